use std::io::Write;

use ferrite_report::ReportOp;

// ---------------------------------------------------------------------------
// SSE framing helpers
// ---------------------------------------------------------------------------

/// Raw HTTP head of an event stream. tiny_http has no streaming bodies, so
/// the handler writes this itself after `into_writer()`.
pub const SSE_RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
                                     Content-Type: text/event-stream\r\n\
                                     Cache-Control: no-cache\r\n\
                                     Connection: keep-alive\r\n\
                                     X-Accel-Buffering: no\r\n\
                                     \r\n";

/// Formats a named SSE event with a JSON data payload.
///
/// Output format:
/// ```text
/// event: <name>\n
/// data: <json>\n
/// \n
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Formats a keep-alive SSE comment.
/// EventSource clients ignore lines starting with `:`.
pub fn format_sse_keepalive() -> &'static str {
    ": ping\n\n"
}

/// Frames one report op, named after the op.
pub fn op_frame(op: &ReportOp) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(op)?;
    Ok(format_sse_event(op.event_name(), &json))
}

/// Writes a single SSE message, flushing immediately.
/// Returns `false` if the write failed (client disconnected).
pub fn write_sse<W: Write>(writer: &mut W, msg: &str) -> bool {
    writer.write_all(msg.as_bytes()).is_ok() && writer.flush().is_ok()
}
