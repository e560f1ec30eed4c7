use std::collections::HashMap;
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    pub fn as_str(&self) -> &str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ko" | "korean" => Some(Language::Ko),
            "en" | "english" => Some(Language::En),
            _ => None,
        }
    }
}

/// String lookup injected into whatever renders text for the user.
pub trait Translate {
    /// Looks up `key` and substitutes `{0}`, `{1}`, ... with `args`.
    /// Unknown keys come back unchanged.
    fn translate(&self, key: &str, args: &[&str]) -> String;
}

/// Built-in translation tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: Language,
    tables: HashMap<Language, HashMap<&'static str, &'static str>>,
}

impl Catalog {
    pub fn new(language: Language) -> Self {
        let mut tables = HashMap::new();
        tables.insert(Language::En, EN.iter().copied().collect());
        tables.insert(Language::Ko, KO.iter().copied().collect());
        Self { language, tables }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, args: &[&str]) -> String {
        let mut text = self
            .tables
            .get(&self.language)
            .and_then(|table| table.get(key))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string());

        for (i, arg) in args.iter().enumerate() {
            text = text.replacen(&format!("{{{}}}", i), arg, 1);
        }
        text
    }
}

const EN: &[(&str, &str)] = &[
    ("header.title", "IELTS Writing Practice"),
    ("task.1g.title", "Task 1 (G)"),
    ("task.1a.title", "Task 1 (A)"),
    ("task.2.title", "Task 2 (All)"),
    ("task.minWords", "Min {0} words"),
    ("task.timeRecommended", "{0} min recommended"),
    ("questions.title", "Question Selection"),
    ("questions.past", "Past Papers"),
    ("questions.mock", "Mock Tests"),
    ("writing.timeRemaining", "Time remaining"),
    ("writing.timeUp", "Time is up!"),
    ("writing.wordCount", "{0}/{1} words"),
    ("writing.wordCountMet", "✓ Word count met"),
    ("writing.moreNeeded", "{0} more needed"),
    ("writing.timeExceeded", "Time exceeded"),
    ("review.overallBandScore", "Overall Band Score"),
    ("review.good", "Good"),
    ("review.competent", "Competent"),
    ("review.developing", "Developing"),
    ("review.wordCount", "Word Count"),
    ("review.timeSpent", "Time Spent"),
    ("review.targetWords", "Target Words"),
    ("review.timeLimit", "Time Limit"),
    ("review.wordCountMet", "Word count requirement met"),
    ("review.belowMinimum", "Below minimum word count"),
    ("review.withinTimeLimit", "Completed within time limit"),
    ("review.exceededTimeLimit", "Exceeded time limit"),
    ("review.taskResponse", "Task Response"),
    ("review.coherenceCohesion", "Coherence & Cohesion"),
    ("review.lexicalResource", "Lexical Resource"),
    ("review.grammaticalAccuracy", "Grammatical Accuracy"),
    ("review.strengths", "Strengths"),
    ("review.improvements", "Areas for Improvement"),
    ("review.suggestions", "Study Suggestions"),
    ("review.yourEssay", "Your Essay"),
    ("review.suggestionsFound", "Found {0} suggestions for simplification"),
    ("review.suggestionFound", "Found {0} suggestion for simplification"),
];

const KO: &[(&str, &str)] = &[
    ("header.title", "IELTS Writing Practice"),
    ("task.1g.title", "Task 1 (G)"),
    ("task.1a.title", "Task 1 (A)"),
    ("task.2.title", "Task 2 (All)"),
    ("task.minWords", "최소 {0}단어"),
    ("task.timeRecommended", "{0}분 권장"),
    ("questions.title", "문제 선택"),
    ("questions.past", "기출문제"),
    ("questions.mock", "모의문제"),
    ("writing.timeRemaining", "남은 시간"),
    ("writing.timeUp", "시간 종료!"),
    ("writing.wordCount", "{0}/{1} 단어"),
    ("writing.wordCountMet", "✓ 단어 수 충족"),
    ("writing.moreNeeded", "{0}단어 더 필요"),
    ("writing.timeExceeded", "시간 초과"),
    ("review.overallBandScore", "전체 밴드 점수"),
    ("review.good", "우수"),
    ("review.competent", "양호"),
    ("review.developing", "개선 필요"),
    ("review.wordCount", "단어 수"),
    ("review.timeSpent", "소요 시간"),
    ("review.targetWords", "목표 단어 수"),
    ("review.timeLimit", "제한 시간"),
    ("review.wordCountMet", "단어 수 요구사항 충족"),
    ("review.belowMinimum", "최소 단어 수 미달"),
    ("review.withinTimeLimit", "제한 시간 내 완료"),
    ("review.exceededTimeLimit", "제한 시간 초과"),
    ("review.taskResponse", "Task Response"),
    ("review.coherenceCohesion", "Coherence & Cohesion"),
    ("review.lexicalResource", "Lexical Resource"),
    ("review.grammaticalAccuracy", "Grammatical Accuracy"),
    ("review.strengths", "강점"),
    ("review.improvements", "개선이 필요한 부분"),
    ("review.suggestions", "학습 제안"),
    ("review.yourEssay", "내 에세이"),
    ("review.suggestionsFound", "{0}개의 개선 제안을 찾았습니다"),
    ("review.suggestionFound", "{0}개의 개선 제안을 찾았습니다"),
];
