//! Charm-style CLI prompts using cliclack

use crate::error::{Error, Result};
use crate::prompts::{parse_number, Answer, PromptKind, Prompter, Question};
use crate::templates::fetcher::TemplateFetcher;
use crate::templates::reference::TemplateReference;
use std::io;
use std::path::PathBuf;

/// Asks each question interactively, re-asking until the answer validates
#[derive(Debug, Default)]
pub struct CliclackPrompter;

impl CliclackPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for CliclackPrompter {
    fn ask(&mut self, question: &Question) -> Result<Answer> {
        let answer = match question.kind {
            PromptKind::Input => Answer::Text(ask_text(question)?),
            PromptKind::Password => {
                let validator = question.validator.clone();
                let value: String = cliclack::password(&question.message)
                    .mask('▪')
                    .validate(move |input: &String| validator.check_text(input))
                    .interact()
                    .map_err(prompt_error)?;
                Answer::Text(value)
            }
            PromptKind::Number => {
                let mut input = cliclack::input(&question.message).validate(|input: &String| {
                    parse_number(input)
                        .map(|_| ())
                        .ok_or("Please enter a number")
                });
                if let Some(default) = question.default_number() {
                    input = input.default_input(&default.to_string());
                }
                let value: String = input.interact().map_err(prompt_error)?;
                match parse_number(&value) {
                    Some(n) => Answer::Number(n),
                    None => {
                        return Err(question.validation_error("Please enter a number".to_string()))
                    }
                }
            }
            PromptKind::Confirm => {
                let value = cliclack::confirm(&question.message)
                    .initial_value(question.default_bool().unwrap_or(false))
                    .interact()
                    .map_err(prompt_error)?;
                Answer::Bool(value)
            }
            PromptKind::Select => {
                if question.choices.is_empty() {
                    return Err(question.validation_error("no choices available".to_string()));
                }
                let mut select = cliclack::select(&question.message);
                for choice in &question.choices {
                    select = select.item(choice.value.clone(), &choice.name, "");
                }
                if let Some(initial) = question.default_choice() {
                    select = select.initial_value(initial);
                }
                Answer::Text(select.interact().map_err(prompt_error)?)
            }
            PromptKind::MultiSelect => {
                let mut multi = cliclack::multiselect(&question.message);
                for choice in &question.choices {
                    multi = multi.item(choice.value.clone(), &choice.name, "");
                }
                let selected: Vec<String> = multi
                    .initial_values(question.default_selection())
                    .required(question.validator.required)
                    .interact()
                    .map_err(prompt_error)?;
                Answer::Multi(selected)
            }
        };

        Ok(answer)
    }
}

fn ask_text(question: &Question) -> Result<String> {
    let validator = question.validator.clone();
    let mut input = cliclack::input(&question.message)
        .required(question.validator.required)
        .validate(move |input: &String| validator.check_text(input));

    if let Some(default) = question.default_text() {
        input = input.default_input(&default).placeholder(&default);
    }

    input.interact().map_err(prompt_error)
}

/// Ctrl-C and Esc surface as `Interrupted`
fn prompt_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::Interrupted {
        Error::PromptAborted
    } else {
        Error::io("Failed to read answer", e)
    }
}

/// Fetch a template, showing a spinner while a remote download runs
pub async fn fetch_template(
    fetcher: &TemplateFetcher,
    reference: &TemplateReference,
) -> Result<PathBuf> {
    if let TemplateReference::Local(_) = reference {
        return fetcher.fetch(reference).await;
    }

    let spinner = cliclack::spinner();
    spinner.start("Downloading template");

    match fetcher.fetch(reference).await {
        Ok(path) => {
            spinner.stop("done");
            Ok(path)
        }
        Err(e) => {
            spinner.error("failed");
            Err(e)
        }
    }
}
