//! Non-interactive prompter that accepts every default

use super::{Answer, PromptKind, Prompter, Question};
use crate::error::Result;

/// Answers each question with its resolved default
///
/// Questions without a usable default fall back to an empty answer, which
/// fails validation for required prompts instead of blocking on input.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&mut self, question: &Question) -> Result<Answer> {
        let answer = match question.kind {
            PromptKind::Input | PromptKind::Password => {
                Answer::Text(question.default_text().unwrap_or_default())
            }
            PromptKind::Number => match question.default_number() {
                Some(n) => Answer::Number(n),
                None => {
                    return Err(question.validation_error("a number is required".to_string()))
                }
            },
            PromptKind::Confirm => Answer::Bool(question.default_bool().unwrap_or(false)),
            PromptKind::Select => match question.default_choice() {
                Some(choice) => Answer::Text(choice),
                None => return Err(question.validation_error("no choices available".to_string())),
            },
            PromptKind::MultiSelect => Answer::Multi(question.default_selection()),
        };

        question
            .validate(&answer)
            .map_err(|reason| question.validation_error(reason))?;

        tracing::debug!(key = %question.key, "accepted default answer");
        Ok(answer)
    }
}
