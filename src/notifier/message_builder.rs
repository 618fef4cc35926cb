/// Accumulates Slack message text, escaping the characters Slack reserves for its markup.
///
/// See <https://api.slack.com/reference/surfaces/formatting#escaping>.
#[derive(Default)]
pub struct MessageBuilder {
    pub(crate) text: String,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(self) -> String {
        self.text
    }
}

impl std::fmt::Write for MessageBuilder {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let mut last = 0;
        for (i, c) in s.char_indices() {
            let escaped = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                _ => continue,
            };

            self.text.push_str(&s[last..i]);
            self.text.push_str(escaped);
            last = i + 1;
        }

        if last < s.len() {
            self.text.push_str(&s[last..]);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use super::*;

    #[test]
    fn slack_escape() {
        let mut msgbld = MessageBuilder::new();

        write!(&mut msgbld, "These should be escaped: < > & but not \" '").unwrap();

        assert_eq!(
            msgbld.build(),
            "These should be escaped: &lt; &gt; &amp; but not \" '"
        );
    }

    #[test]
    fn multibyte_text_survives() {
        let mut msgbld = MessageBuilder::new();

        write!(&mut msgbld, "⭐ <é>").unwrap();

        assert_eq!(msgbld.build(), "⭐ &lt;é&gt;");
    }
}
