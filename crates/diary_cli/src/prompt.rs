//! Line-oriented prompter over any reader/writer pair (stdin/stdout in the
//! binary).

use std::io::{BufRead, Write};

use chrono::NaiveDate;
use diary_core::{
    format_date, AttachmentReader, EntryDraft, EntryPrompter, Happiness, PromptError,
};

const SUMMARY_PARTS: [&str; 4] = [
    "This morning, I",
    "In the afternoon, I",
    "During the evening, I",
    "Overall, I'd say today was",
];

/// Asks for each part of an entry on `output` and reads answers from `input`.
///
/// End of input or `q` at the first question stops the catch-up.
pub struct ConsolePrompter<R, W, P> {
    input: R,
    output: W,
    attachments: P,
}

impl<R: BufRead, W: Write, P: AttachmentReader> ConsolePrompter<R, W, P> {
    pub fn new(input: R, output: W, attachments: P) -> Self {
        Self {
            input,
            output,
            attachments,
        }
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>, PromptError> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask_happiness(&mut self) -> Result<Option<Happiness>, PromptError> {
        let choices = Happiness::all()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        loop {
            let Some(answer) = self.ask(&format!("How would you rate today? [{choices}]"))? else {
                return Ok(None);
            };
            match Happiness::parse(answer.trim()) {
                Ok(rating) => return Ok(Some(rating)),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }
}

impl<R: BufRead, W: Write, P: AttachmentReader> EntryPrompter for ConsolePrompter<R, W, P> {
    fn compose(
        &mut self,
        date: NaiveDate,
        weekday: &str,
    ) -> Result<Option<EntryDraft>, PromptError> {
        let heading = format!(
            "Entry for {weekday}, {}. Press enter to start, q to stop.",
            format_date(date)
        );
        match self.ask(&heading)? {
            Some(answer) if !answer.trim().eq_ignore_ascii_case("q") => {}
            _ => return Ok(None),
        }

        let mut lines = Vec::with_capacity(SUMMARY_PARTS.len());
        for part in SUMMARY_PARTS {
            let Some(answer) = self.ask(&format!("{part}..."))? else {
                return Ok(None);
            };
            lines.push(format!("{part} {}", answer.trim()));
        }

        let Some(happiness) = self.ask_happiness()? else {
            return Ok(None);
        };
        let Some(people) = self.ask("Who did you see? (comma separated)")? else {
            return Ok(None);
        };
        let Some(reference) = self.ask("Attachment length (H:MM:SS, blank for none)")? else {
            return Ok(None);
        };
        let reference = reference.trim();
        let attachment = if reference.is_empty() {
            None
        } else {
            let duration = self.attachments.read_duration(reference);
            if duration.is_none() {
                return Err(PromptError::Invalid(format!(
                    "attachment `{reference}` has no readable duration"
                )));
            }
            duration
        };

        Ok(Some(EntryDraft {
            summary: Some(lines.join("\n")),
            happiness: Some(happiness),
            attachment,
            people: people.split(',').map(str::to_string).collect(),
        }))
    }
}
