//! The tool text protocol.
//!
//! Small models are asked to answer in one of two literal forms:
//!
//! ```text
//! TOOL: list_files | ARGS: sensors
//! SUMMARY: the greenhouse service is running again
//! ```
//!
//! Anything else is an ordinary reply. This module is the only place the
//! markers are matched.

pub const SUMMARY_MARKER: &str = "SUMMARY:";
pub const TOOL_MARKER: &str = "TOOL:";
pub const ARGS_MARKER: &str = "ARGS:";
pub const ARGS_SEPARATOR: char = '|';

/// A tool call pulled out of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    /// `None` when the reply had no `|` part or it was blank.
    pub args: Option<String>,
}

/// The three mutually exclusive shapes a reply can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyShape {
    /// `SUMMARY:` seen; holds the text after the marker.
    Terminal(String),
    /// `TOOL:` seen.
    Invoke(Invocation),
    /// Neither marker present.
    PlainReply(String),
}

/// Classify a reply. `SUMMARY:` wins over `TOOL:` when both appear.
pub fn parse(reply: &str) -> ReplyShape {
    if let Some(idx) = reply.find(SUMMARY_MARKER) {
        let text = reply[idx + SUMMARY_MARKER.len()..].trim();
        return ReplyShape::Terminal(text.to_string());
    }

    if reply.contains(TOOL_MARKER) {
        let mut parts = reply.split(ARGS_SEPARATOR);
        // Everything before the first `|`, marker removed, is the name.
        // Chatter around it makes the name unknown to the registry.
        let name = parts
            .next()
            .unwrap_or_default()
            .replace(TOOL_MARKER, "")
            .trim()
            .to_string();

        let args = parts
            .next()
            .map(|part| part.replacen(ARGS_MARKER, "", 1).trim().to_string())
            .filter(|a| !a.is_empty());

        return ReplyShape::Invoke(Invocation { name, args });
    }

    ReplyShape::PlainReply(reply.to_string())
}

/// Instructions appended to the system prompt of tool-enabled agents.
pub fn protocol_instructions() -> String {
    format!(
        "To use a tool, respond with: {TOOL_MARKER} <tool_name> {ARGS_SEPARATOR} {ARGS_MARKER} <arguments>\n\
         When done with all tasks, respond with: {SUMMARY_MARKER} <brief summary>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(name: &str, args: Option<&str>) -> ReplyShape {
        ReplyShape::Invoke(Invocation {
            name: name.into(),
            args: args.map(String::from),
        })
    }

    #[test]
    fn tool_with_args() {
        assert_eq!(parse("TOOL: list_files | ARGS: ."), invoke("list_files", Some(".")));
    }

    #[test]
    fn tool_without_args() {
        assert_eq!(parse("TOOL: system_info"), invoke("system_info", None));
        assert_eq!(parse("TOOL: read_notes | ARGS:   "), invoke("read_notes", None));
    }

    #[test]
    fn chatter_around_tool_line() {
        assert_eq!(
            parse("Let me look!\nTOOL: list_files\nOne moment."),
            invoke("Let me look!\n list_files\nOne moment.", None)
        );
        assert_eq!(parse("Sure TOOL: list_files"), invoke("Sure  list_files", None));
    }

    #[test]
    fn words_after_the_name_belong_to_it() {
        assert_eq!(
            parse("TOOL: list_files please | ARGS: ."),
            invoke("list_files please", Some("."))
        );
    }

    #[test]
    fn only_second_segment_is_args() {
        assert_eq!(
            parse("TOOL: run_command | ARGS: ls -la | extra"),
            invoke("run_command", Some("ls -la"))
        );
    }

    #[test]
    fn args_without_marker_still_count() {
        assert_eq!(
            parse("TOOL: write_note | buy seeds"),
            invoke("write_note", Some("buy seeds"))
        );
    }

    #[test]
    fn summary_is_terminal() {
        assert_eq!(parse("SUMMARY: done"), ReplyShape::Terminal("done".into()));
        assert_eq!(
            parse("All checks passed.\nSUMMARY:  service healthy "),
            ReplyShape::Terminal("service healthy".into())
        );
    }

    #[test]
    fn summary_wins_over_tool() {
        assert_eq!(
            parse("TOOL: list_files\nSUMMARY: nothing to do"),
            ReplyShape::Terminal("nothing to do".into())
        );
    }

    #[test]
    fn anything_else_is_plain() {
        let reply = "Dolphins are so smart! Do you like the ocean?";
        assert_eq!(parse(reply), ReplyShape::PlainReply(reply.into()));
        // Markers are case sensitive
        assert!(matches!(parse("tool: list_files"), ReplyShape::PlainReply(_)));
    }

    #[test]
    fn empty_tool_name() {
        assert_eq!(parse("TOOL:"), invoke("", None));
    }
}
