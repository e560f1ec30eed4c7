use serde::{Serialize, Deserialize};
use validator::Validate;

/// A writing prompt with its constraints, as stored in the question bank.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub time_limit: u32, // in minutes
    #[validate(range(min = 1))]
    pub word_limit: u32, // minimum words
    #[serde(rename = "type")]
    pub task_type: String, // Bar Chart, Opinion Essay, Formal Letter, ...
}

impl Task {
    pub fn time_limit_seconds(&self) -> u64 {
        u64::from(self.time_limit) * 60
    }

    /// Task 2 prompts are all essays; Task 1 prompts describe visuals or ask for a letter.
    pub fn is_essay(&self) -> bool {
        self.task_type.contains("Essay")
    }
}

/// Question bank partition, one per exam task.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskPart {
    Task1General,
    Task1Academic,
    Task2,
}

impl TaskPart {
    pub const ALL: [TaskPart; 3] = [TaskPart::Task1General, TaskPart::Task1Academic, TaskPart::Task2];

    pub fn as_str(&self) -> &str {
        match self {
            TaskPart::Task1General => "task1_general",
            TaskPart::Task1Academic => "task1_academic",
            TaskPart::Task2 => "task2",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task1_general" | "1g" | "part1_general" => Some(TaskPart::Task1General),
            "task1_academic" | "1a" | "part1_academic" => Some(TaskPart::Task1Academic),
            "task2" | "2" | "part2" => Some(TaskPart::Task2),
            _ => None,
        }
    }

    /// Translation key for the part's card title.
    pub fn title_key(&self) -> &'static str {
        match self {
            TaskPart::Task1General => "task.1g.title",
            TaskPart::Task1Academic => "task.1a.title",
            TaskPart::Task2 => "task.2.title",
        }
    }
}

/// Whether a prompt comes from a past paper or a mock test.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskCollection {
    Past,
    Mock,
}

impl TaskCollection {
    pub fn title_key(&self) -> &'static str {
        match self {
            TaskCollection::Past => "questions.past",
            TaskCollection::Mock => "questions.mock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "p2-opinion".to_string(),
            title: "Technology and Education".to_string(),
            description: "Discuss both views and give your own opinion.".to_string(),
            time_limit: 40,
            word_limit: 250,
            task_type: "Opinion Essay".to_string(),
        }
    }

    #[test]
    fn test_task_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["timeLimit"], 40);
        assert_eq!(json["wordLimit"], 250);
        assert_eq!(json["type"], "Opinion Essay");
    }

    #[test]
    fn test_task_validation() {
        assert!(sample().validate().is_ok());

        let mut broken = sample();
        broken.word_limit = 0;
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_time_limit_and_kind() {
        let task = sample();
        assert_eq!(task.time_limit_seconds(), 2400);
        assert!(task.is_essay());
    }

    #[test]
    fn test_part_aliases() {
        assert_eq!(TaskPart::from_str("part1_academic"), Some(TaskPart::Task1Academic));
        assert_eq!(TaskPart::from_str("2"), Some(TaskPart::Task2));
        assert_eq!(TaskPart::from_str("part3"), None);
    }
}
