//! Batched result messages.
//!
//! A batch handler sorts the ids it was given into outcome classes (not
//! found, cycle, success...). Each non-empty class becomes one sentence with
//! singular or plural phrasing; the sentences are joined line by line.

/// Message for a command that changed nothing.
pub const NOTHING_CHANGED: &str = "Nothing changed.";

/// Join items as "a", "a and b", "a, b and c".
pub fn enumeration<T: ToString>(items: &[T]) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// Accumulates one sentence per non-empty outcome class.
#[derive(Debug, Default)]
pub struct Report {
    sentences: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sentence for `ids`, built by `singular` from the only id or by
    /// `plural` from the enumeration. Empty classes add nothing.
    pub fn class(
        mut self,
        ids: &[i64],
        singular: impl FnOnce(i64) -> String,
        plural: impl FnOnce(String) -> String,
    ) -> Self {
        match ids {
            [] => {}
            [id] => self.sentences.push(singular(*id)),
            _ => self.sentences.push(plural(enumeration(ids))),
        }
        self
    }

    /// Sentences joined by newlines, or [`NOTHING_CHANGED`] when every class
    /// was empty.
    pub fn finish(self) -> String {
        if self.sentences.is_empty() {
            NOTHING_CHANGED.to_string()
        } else {
            self.sentences.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration() {
        assert_eq!(enumeration::<i64>(&[]), "");
        assert_eq!(enumeration(&[1]), "1");
        assert_eq!(enumeration(&[1, 2]), "1 and 2");
        assert_eq!(enumeration(&[1, 2, 3]), "1, 2 and 3");
    }

    #[test]
    fn test_report_singular_and_plural() {
        let message = Report::new()
            .class(&[7], |id| format!("Task {} is missing.", id), |ids| {
                format!("Tasks {} are missing.", ids)
            })
            .class(&[1, 5], |id| format!("Task {} done.", id), |ids| {
                format!("Tasks {} done.", ids)
            })
            .finish();

        assert_eq!(message, "Task 7 is missing.\nTasks 1 and 5 done.");
    }

    #[test]
    fn test_empty_report() {
        let message = Report::new()
            .class(&[], |_| unreachable!(), |_| unreachable!())
            .finish();
        assert_eq!(message, NOTHING_CHANGED);
    }
}
