// Prompt assembly and the weekly window over logged questions.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

pub const EMPTY_SHEET_MESSAGE: &str = "The log sheet is empty. There is nothing to report yet.";
pub const NO_QUESTIONS_MESSAGE: &str = "No questions were asked in the past week.";

/// Column holding the timestamp of a logged question.
const TIMESTAMP_COLUMN: usize = 0;
/// Column holding the question text.
const QUESTION_COLUMN: usize = 2;

/// Naive layouts a timestamp cell may come back in. Sheets re-renders values
/// it recognised as dates, so the US locale layout shows up too.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Wraps the user's question with the document context.
pub fn build_grounded_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant for a team of virtual assistants. \
         Answer the question using only the context below, which was taken \
         from the team's shared documents.\n\
         If the answer is not in the context, say clearly that the documents \
         do not contain the answer instead of guessing.\n\n\
         Context:\n{}\n\n\
         Question:\n{}",
        context, question
    )
}

/// Builds the weekly management report prompt, one bullet per question.
pub fn build_report_prompt(questions: &[String]) -> String {
    let bullets: Vec<String> = questions.iter().map(|q| format!("- {}", q)).collect();

    format!(
        "Below are the questions our virtual assistants asked the documentation \
         assistant during the past week.\n\n\
         {}\n\n\
         Write a short report for management that:\n\
         1. Identifies the 2-3 most common themes in these questions.\n\
         2. Points out gaps in our documentation or training that the questions reveal.\n\
         3. Gives concrete suggestions for improving the documents or the training.",
        bullets.join("\n")
    )
}

/// Parses a timestamp cell. Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

/// Questions logged strictly after `now - window`, in row order.
///
/// The first row is the header. Rows whose timestamp does not parse are
/// treated as old.
pub fn recent_questions(rows: &[Vec<String>], now: DateTime<Utc>, window: Duration) -> Vec<String> {
    let cutoff = now - window;

    rows.iter()
        .skip(1)
        .filter(|row| {
            row.get(TIMESTAMP_COLUMN)
                .and_then(|cell| parse_timestamp(cell))
                .is_some_and(|ts| ts > cutoff)
        })
        .map(|row| row.get(QUESTION_COLUMN).cloned().unwrap_or_default())
        .collect()
}
