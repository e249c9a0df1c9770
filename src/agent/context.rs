//! Briefing prompt construction
//!
//! `BriefingPrompt` produces the fixed system instruction and the
//! task-framing user turns that seed a fresh conversation.

use chrono::NaiveDate;

/// System instruction sent with every model call.
pub const SYSTEM_PROMPT: &str = "You are an AI agent that can use tools to produce a daily summary of my day.
Be concise and to the point, do not include any other text.
You must only return markdown formatted text.";

const REPORT_TEMPLATE: &str = r#"Start each file with some interesting ASCII art max 8 x 8 characters.
{ascii art}
# Good Morning {name}!
{tell me a joke}
## Calendar 📅

### {time} | {meeting title}
- **Attendees**: {attendees}
- **Topic**: {meeting topic}
- **Zoom**: {zoom link}

#### Notes:
-

## Things I need to review 👀

n items need review from my team:

1. [task identifier](link) - title (assigned to)

## Things I need to do ✅

Active issues assigned to you:

**High Priority**:
- (emoji representing priority) [task identifier](link) - title(status)

**In Progress**:
- (emoji representing priority) [task identifier](link) - title(status)

**To Do**:
- (emoji representing priority) [task identifier](link) - title(status)
## Suggestions 💡
-- Add suggestions for my day here
"#;

/// Builder for the briefing conversation's opening context.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use good_morning::agent::BriefingPrompt;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// let prompt = BriefingPrompt::new(date).with_name("Sam").with_teams(&["ENG".into()]);
/// let turns = prompt.seed_turns();
/// assert_eq!(turns[0], "The current date is 2025-03-07");
/// assert!(turns[1].contains("Sam"));
/// ```
#[derive(Debug, Clone)]
pub struct BriefingPrompt {
    date: NaiveDate,
    name: Option<String>,
    teams: Vec<String>,
    available_tools: Vec<String>,
}

impl BriefingPrompt {
    /// Prompt for the given briefing date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            name: None,
            teams: Vec::new(),
            available_tools: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_teams(mut self, teams: &[String]) -> Self {
        self.teams = teams.to_vec();
        self
    }

    /// Record which tools are registered, so the model is not told to use
    /// a source that is not configured.
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.available_tools = tools;
        self
    }

    /// The system instruction, with an available-tools section when known.
    pub fn system_prompt(&self) -> String {
        if self.available_tools.is_empty() {
            return SYSTEM_PROMPT.to_string();
        }
        format!(
            "{}\n\n## Runtime Context\n\n- Available tools: {}",
            SYSTEM_PROMPT,
            self.available_tools.join(", ")
        )
    }

    /// User turns that frame the task, in append order.
    pub fn seed_turns(&self) -> Vec<String> {
        let mut turns = vec![format!("The current date is {}", self.date.format("%Y-%m-%d"))];

        match (&self.name, self.teams.is_empty()) {
            (Some(name), false) => turns.push(format!(
                "My name is {} and I'm an engineer in teams {}",
                name,
                self.teams.join(",")
            )),
            (Some(name), true) => turns.push(format!("My name is {}", name)),
            (None, false) => turns.push(format!(
                "I'm an engineer in teams {}",
                self.teams.join(",")
            )),
            (None, true) => {}
        }

        turns.extend(
            [
                "What's the plan for today? Check my calendar for meetings and Linear for any issues I need to review or work on. Include Zoom links or Linear links if they exist. I like emojis, please use them.",
                "Create a section for each meeting I have, include a note of the people in attendance and the topic of the meeting, with some space for notes.",
                "Create a section for each issue I need to review for my team, that is everyone except me, include a note of the title, author, and priority of the issue with a link to the issue, do not redact.",
                "Create a section for each thing I need to do, include a note of the title, author, and priority of the issue with a link to the issue.",
                "Create a markdown formatted with the following gist",
                REPORT_TEMPLATE,
            ]
            .map(String::from),
        );
        turns
    }
}
