//! Incremental parser for the text/event-stream wire format.
//!
//! The transport feeds raw byte chunks in as they arrive; chunk boundaries
//! carry no meaning, so the parser buffers until it has complete lines. A
//! blank line terminates a frame. Frames with an empty data buffer are
//! discarded, matching browser EventSource behavior.

/// One complete server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name; `message` when the frame carried no `event:` field.
    pub name: String,
    /// Data payload; multi-line `data:` fields are joined with `\n`.
    pub data: String,
}

/// Streaming SSE frame parser.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event_name: Option<String>,
    data_lines: Vec<String>,
}

impl SseParser {
    /// Create a parser with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk of bytes and return any events completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(line) = self.take_line() {
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Remove the next complete line from the buffer, stripping the
    /// terminator. Lines end with `\n`; a preceding `\r` is dropped.
    fn take_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.finish_frame();
        }
        if line.starts_with(':') {
            // comment / keep-alive
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event_name = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // id and retry are not used by this client
            _ => {}
        }
        None
    }

    fn finish_frame(&mut self) -> Option<SseEvent> {
        let name = self.event_name.take();
        let data_lines = std::mem::take(&mut self.data_lines);
        if data_lines.is_empty() {
            return None;
        }
        Some(SseEvent {
            name: name.unwrap_or_else(|| "message".to_string()),
            data: data_lines.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_all(parser: &mut SseParser, input: &str) -> Vec<SseEvent> {
        parser.feed(input.as_bytes())
    }

    #[test]
    fn parses_named_event() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, "event: model-init\ndata: [1,2]\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                name: "model-init".into(),
                data: "[1,2]".into()
            }]
        );
    }

    #[test]
    fn defaults_to_message_event_name() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, "data: hello\n\n");
        assert_eq!(events[0].name, "message");
    }

    #[test]
    fn joins_multi_line_data() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, "data: one\ndata: two\n\n");
        assert_eq!(events[0].data, "one\ntwo");
    }

    #[test]
    fn handles_chunks_split_mid_line() {
        let mut parser = SseParser::new();
        assert_eq!(parser.feed(b"event: sta"), vec![]);
        assert_eq!(parser.feed(b"tus\ndata: {\"up\""), vec![]);
        let events = parser.feed(b": true}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "status");
        assert_eq!(events[0].data, "{\"up\": true}");
    }

    #[test]
    fn handles_crlf_terminators() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, "event: x\r\ndata: y\r\n\r\n");
        assert_eq!(events[0].name, "x");
        assert_eq!(events[0].data, "y");
    }

    #[test]
    fn ignores_comment_lines() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, ": keep-alive\n\ndata: z\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "z");
    }

    #[test]
    fn drops_frame_without_data() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, "event: empty\n\n");
        assert_eq!(events, vec![]);
    }

    #[test]
    fn parses_consecutive_events_in_one_chunk() {
        let mut parser = SseParser::new();
        let events = parse_all(&mut parser, "event: a\ndata: 1\n\nevent: b\ndata: 2\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "a");
        assert_eq!(events[1].name, "b");
    }
}
