//! Dictionary of response status codes and messages.
//!
//! The 64 standard HTTP statuses are so common that they are hard-coded with
//! references 0..=63. Anything else (nonstandard codes, standard codes with a
//! nonstandard message) gets a custom reference counting down from -64, so a
//! zig-zag varint encoder still fits either kind of reference in one byte.
//! Custom codes and messages must be stored next to the sample data to make
//! the references resolvable again.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Reference meaning "no status recorded".
pub const UNSET_REF: i32 = -1;

const CUSTOM_START_REF: i32 = -64;

#[rustfmt::skip]
const STANDARD_CODES: [&str; 64] = [
    "0", "100", "101", "102", "200", "201", "202", "203", "204", "205",
    "206", "207", "208", "226", "300", "301", "302", "303", "304", "305",
    "307", "308", "400", "401", "402", "403", "404", "405", "406", "407",
    "408", "409", "410", "411", "412", "413", "414", "415", "416", "417",
    "418", "421", "422", "423", "424", "426", "428", "429", "431", "444",
    "451", "499", "500", "501", "502", "503", "504", "505", "506", "507",
    "508", "510", "511", "599",
];

#[rustfmt::skip]
const STANDARD_MESSAGES: [&str; 64] = [
    "Unspecified", "Continue", "Switching Protocols", "Processing", "OK",
    "Created", "Accepted", "Non-authoritative Information", "No Content",
    "Reset Content", "Partial Content", "Multi-Status", "Already Reported",
    "IM Used", "Multiple Choices", "Moved Permanently", "Found", "See Other",
    "Not Modified", "Use Proxy", "Temporary Redirect", "Permanent Redirect",
    "Bad Request", "Unauthorized", "Payment Required", "Forbidden",
    "Not Found", "Method Not Allowed", "Not Acceptable",
    "Proxy Authentication Required", "Request Timeout", "Conflict", "Gone",
    "Length Required", "Precondition Failed", "Payload Too Large",
    "Request-URI Too Long", "Unsupported Media Type",
    "Requested Range Not Satisfiable", "Expectation Failed", "I'm a teapot",
    "Misdirected Request", "Unprocessable Entity", "Locked",
    "Failed Dependency", "Upgrade Required", "Precondition Required",
    "Too Many Requests", "Request Header Fields Too Large",
    "Connection Closed Without Response", "Unavailable For Legal Reasons",
    "Client Closed Request", "Internal Server Error", "Not Implemented",
    "Bad Gateway", "Service Unavailable", "Gateway Timeout",
    "HTTP Version Not Supported", "Variant Also Negotiates",
    "Insufficient Storage", "Loop Detected", "Not Extended",
    "Network Authentication Required", "Network Connect Timeout Error",
];

/// Maps (code, message) pairs to compact references and back. Instances are
/// independent: each artifact carries its own custom range.
#[derive(Debug)]
pub struct StatusCodeLookup {
    code_to_ref: HashMap<&'static str, i32>,
    custom_refs: HashMap<(String, String), i32>,
    custom_codes: Vec<String>,
    custom_messages: Vec<String>,
}

impl StatusCodeLookup {
    pub fn new() -> Self {
        let code_to_ref = STANDARD_CODES
            .iter()
            .enumerate()
            .map(|(i, &code)| (code, i as i32))
            .collect();
        Self {
            code_to_ref,
            custom_refs: HashMap::new(),
            custom_codes: Vec::new(),
            custom_messages: Vec::new(),
        }
    }

    /// Rebuilds a lookup from the custom code/message lists saved in an
    /// artifact. Yields the exact same references the writer handed out.
    pub fn with_custom(custom_codes: Vec<String>, custom_messages: Vec<String>) -> Result<Self> {
        if custom_codes.len() != custom_messages.len() {
            return Err(Error::ClientInput(
                "custom codes and messages are uneven".to_string(),
            ));
        }
        let mut lookup = Self::new();
        for (i, (code, message)) in
            custom_codes.iter().zip(custom_messages.iter()).enumerate()
        {
            let reference = CUSTOM_START_REF - i as i32;
            lookup
                .custom_refs
                .insert((code.clone(), message.clone()), reference);
        }
        lookup.custom_codes = custom_codes;
        lookup.custom_messages = custom_messages;
        Ok(lookup)
    }

    /// Returns the reference for a (code, message) pair, allocating a custom
    /// reference on first sight of a nonstandard pair. An empty message
    /// matches the standard message for its code.
    pub fn resolve(&mut self, code: &str, message: &str) -> i32 {
        if code.is_empty() && message.is_empty() {
            return UNSET_REF;
        }
        // With only a message to go on, recover the code from the standard table.
        let code = if code.is_empty() {
            STANDARD_MESSAGES
                .iter()
                .position(|&m| m == message)
                .map_or("", |i| STANDARD_CODES[i])
        } else {
            code
        };
        if let Some(&reference) = self.code_to_ref.get(code) {
            if message.is_empty() || message == STANDARD_MESSAGES[reference as usize] {
                return reference;
            }
        }
        let key = (code.to_string(), message.to_string());
        if let Some(&reference) = self.custom_refs.get(&key) {
            return reference;
        }
        let reference = CUSTOM_START_REF - self.custom_codes.len() as i32;
        self.custom_codes.push(key.0.clone());
        self.custom_messages.push(key.1.clone());
        self.custom_refs.insert(key, reference);
        reference
    }

    /// The status code behind a reference, or `None` when the reference is
    /// outside both the standard and custom ranges.
    pub fn code_of(&self, reference: i32) -> Option<&str> {
        self.entry_of(reference, &STANDARD_CODES, &self.custom_codes)
    }

    /// The status message behind a reference.
    pub fn message_of(&self, reference: i32) -> Option<&str> {
        self.entry_of(reference, &STANDARD_MESSAGES, &self.custom_messages)
    }

    fn entry_of<'a>(
        &self,
        reference: i32,
        standard: &'a [&'static str; 64],
        custom: &'a [String],
    ) -> Option<&'a str> {
        if reference == UNSET_REF {
            Some("")
        } else if (0..standard.len() as i32).contains(&reference) {
            Some(standard[reference as usize])
        } else if reference <= CUSTOM_START_REF {
            custom
                .get((CUSTOM_START_REF - reference) as usize)
                .map(|s| s.as_str())
        } else {
            None
        }
    }

    /// Custom codes in allocation order, for persisting next to the rows.
    pub fn custom_codes(&self) -> &[String] {
        &self.custom_codes
    }

    /// Custom messages in allocation order, parallel to `custom_codes`.
    pub fn custom_messages(&self) -> &[String] {
        &self.custom_messages
    }
}

impl Default for StatusCodeLookup {
    fn default() -> Self {
        Self::new()
    }
}
