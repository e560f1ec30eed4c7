use std::collections::{HashMap, HashSet};
use log::info;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::practice::{Task, TaskCollection, TaskPart};

const TASK1_GENERAL: &str = include_str!("../data/task1_general.json");
const TASK1_ACADEMIC: &str = include_str!("../data/task1_academic.json");
const TASK2: &str = include_str!("../data/task2.json");

#[derive(Error, Debug)]
pub enum QuestionBankError {
    #[error("Failed to parse {part} questions: {source}")]
    Parse { part: String, source: serde_json::Error },
    #[error("Invalid task {id}: {source}")]
    Invalid { id: String, source: ValidationErrors },
    #[error("Duplicate task id: {0}")]
    DuplicateId(String),
}

#[derive(Deserialize, Default, Debug, Clone)]
struct PartQuestions {
    #[serde(default)]
    past: Vec<Task>,
    #[serde(default)]
    mock: Vec<Task>,
}

impl PartQuestions {
    fn collection(&self, collection: TaskCollection) -> &[Task] {
        match collection {
            TaskCollection::Past => &self.past,
            TaskCollection::Mock => &self.mock,
        }
    }
}

/// Read-only catalog of writing tasks, partitioned by exam part.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    parts: HashMap<TaskPart, PartQuestions>,
}

impl QuestionBank {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, QuestionBankError> {
        let mut bank = Self::default();
        bank.add_part(TaskPart::Task1General, TASK1_GENERAL)?;
        bank.add_part(TaskPart::Task1Academic, TASK1_ACADEMIC)?;
        bank.add_part(TaskPart::Task2, TASK2)?;
        info!("📚 Loaded {} built-in writing tasks", bank.len());
        Ok(bank)
    }

    pub fn from_json(part: TaskPart, json: &str) -> Result<Self, QuestionBankError> {
        let mut bank = Self::default();
        bank.add_part(part, json)?;
        Ok(bank)
    }

    /// Adds (or replaces) one part from a `{ "past": [..], "mock": [..] }` document.
    pub fn add_part(&mut self, part: TaskPart, json: &str) -> Result<(), QuestionBankError> {
        let questions: PartQuestions = serde_json::from_str(json).map_err(|source| QuestionBankError::Parse {
            part: part.as_str().to_string(),
            source,
        })?;

        let mut seen: HashSet<&str> = self
            .parts
            .iter()
            .filter(|(p, _)| **p != part)
            .flat_map(|(_, q)| q.past.iter().chain(q.mock.iter()))
            .map(|t| t.id.as_str())
            .collect();

        for task in questions.past.iter().chain(questions.mock.iter()) {
            task.validate().map_err(|source| QuestionBankError::Invalid {
                id: task.id.clone(),
                source,
            })?;
            if !seen.insert(task.id.as_str()) {
                return Err(QuestionBankError::DuplicateId(task.id.clone()));
            }
        }

        self.parts.insert(part, questions);
        Ok(())
    }

    pub fn tasks(&self, part: TaskPart, collection: TaskCollection) -> &[Task] {
        self.parts.get(&part).map(|q| q.collection(collection)).unwrap_or(&[])
    }

    pub fn find(&self, id: &str) -> Option<(TaskPart, TaskCollection, &Task)> {
        self.parts.iter().find_map(|(part, questions)| {
            [TaskCollection::Past, TaskCollection::Mock].into_iter().find_map(|collection| {
                questions
                    .collection(collection)
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| (*part, collection, t))
            })
        })
    }

    /// Parts that hold at least one task, in exam order.
    pub fn parts(&self) -> Vec<TaskPart> {
        TaskPart::ALL
            .into_iter()
            .filter(|p| self.parts.get(p).map_or(false, |q| !q.past.is_empty() || !q.mock.is_empty()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.parts.values().map(|q| q.past.len() + q.mock.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
