use colored::Colorize;
use kea_protocol::{
    check_response, encode_field, DhcpOptionData, DhcpOptionField, ExaminableResponse,
    ResponseStatus, SingleOptionData,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config_scan::ScanReport;

/// Outcome of one daemon's reply, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSummary {
    pub daemon: String,
    pub result: i64,
    pub status: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Map<String, Value>>,
}

impl ResponseSummary {
    pub fn new<R>(response: &R, arguments_hash: Option<&str>) -> Self
    where
        R: ExaminableResponse + ?Sized,
    {
        Self {
            daemon: response.daemon().to_string(),
            result: response.result(),
            status: response.status().to_string(),
            text: response.text().to_string(),
            arguments_hash: arguments_hash.map(str::to_string),
            error: check_response(response).err().map(|err| err.to_string()),
            arguments: response.arguments().cloned(),
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Render one line per daemon reply.
pub fn render_responses(rows: &[ResponseSummary]) -> String {
    let mut out = Vec::new();
    for row in rows {
        let daemon = if row.daemon.is_empty() {
            "-"
        } else {
            row.daemon.as_str()
        };
        let mut line = format!(
            "{daemon}: {} ({}) {}",
            row.status, row.result, row.text
        );
        if let Some(hash) = &row.arguments_hash {
            line.push_str(&format!(" arguments_hash={hash}"));
        }
        out.push(paint_status(ResponseStatus::from_code(row.result), line));
        if let Some(error) = &row.error {
            out.push(format!("  {error}"));
        }
    }
    out.join("\n")
}

fn paint_status(status: ResponseStatus, line: String) -> String {
    match status {
        ResponseStatus::Success => line.green().to_string(),
        ResponseStatus::Error => line.red().to_string(),
        ResponseStatus::CommandUnsupported => line.yellow().to_string(),
        ResponseStatus::Empty => line.cyan().to_string(),
        ResponseStatus::Unknown(_) => line,
    }
}

/// Render `option-data` items, one per line.
pub fn render_option_data(items: &[SingleOptionData]) -> String {
    items
        .iter()
        .map(describe_option_data)
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_option_data(item: &SingleOptionData) -> String {
    let mut line = format!(
        "code={} space={} csv-format={} data=\"{}\"",
        item.code, item.space, item.csv_format, item.data
    );
    if !item.name.is_empty() {
        line.push_str(&format!(" name={}", item.name));
    }
    if item.always_send {
        line.push_str(" always-send");
    }
    line
}

/// Render field-typed options, one per line.
pub fn render_options(options: &[DhcpOptionData]) -> String {
    options
        .iter()
        .map(describe_option)
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_option(option: &DhcpOptionData) -> String {
    let fields = option
        .fields
        .iter()
        .map(describe_field)
        .collect::<Vec<_>>()
        .join(", ");
    let mut line = format!(
        "code={} space={} universe={} fields=[{fields}]",
        option.code, option.space, option.universe
    );
    if !option.encapsulate.is_empty() {
        line.push_str(&format!(" encapsulate={}", option.encapsulate));
    }
    line
}

fn describe_field(field: &DhcpOptionField) -> String {
    match encode_field(field, true) {
        Ok(value) => format!("{} {value}", field.field_type()),
        Err(_) => format!("{} <invalid>", field.field_type()),
    }
}

/// Render a configuration scan grouped by scope.
pub fn render_scan(report: &ScanReport) -> String {
    let mut out = vec![format!(
        "universe={} custom_definitions={} options={} failures={}",
        report.universe,
        report.custom_definitions,
        report.options.len(),
        report.failures()
    )
    .cyan()
    .to_string()];

    let mut current_scope: Option<&str> = None;
    for row in &report.options {
        if current_scope != Some(row.scope.as_str()) {
            out.push(format!("[{}]", row.scope));
            current_scope = Some(row.scope.as_str());
        }
        match (&row.option, &row.error) {
            (Some(option), _) => out.push(format!("  {}", describe_option(option)).green().to_string()),
            (None, Some(error)) => out.push(
                format!("  code={} space={} error: {error}", row.data.code, row.data.space)
                    .red()
                    .to_string(),
            ),
            (None, None) => out.push(format!("  {}", describe_option_data(&row.data))),
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use kea_protocol::{
        DhcpOptionData, DhcpOptionField, Response, ResponseHeader, SingleOptionData, Universe,
    };

    use super::{render_option_data, render_options, render_responses, ResponseSummary};

    fn response(result: i64, daemon: &str, text: &str) -> Response {
        Response {
            header: ResponseHeader {
                result,
                text: text.to_string(),
                daemon: daemon.to_string(),
            },
            arguments: None,
        }
    }

    #[test]
    fn summary_carries_status_error_and_hash() {
        let ok = ResponseSummary::new(&response(0, "dhcp4", "done"), Some("abc"));
        assert!(!ok.failed());
        assert_eq!(ok.status, "success");
        assert_eq!(ok.arguments_hash.as_deref(), Some("abc"));

        let unsupported = ResponseSummary::new(&response(2, "dhcp6", "nope"), None);
        assert!(unsupported.failed());
        assert_eq!(unsupported.status, "unsupported command");
    }

    #[test]
    fn renders_one_line_per_reply_plus_errors() {
        colored::control::set_override(false);
        let rows = vec![
            ResponseSummary::new(&response(0, "dhcp4", "done"), Some("abc")),
            ResponseSummary::new(&response(1, "", "broken"), None),
        ];
        let text = render_responses(&rows);
        assert_eq!(
            text,
            "dhcp4: success (0) done arguments_hash=abc\n\
             -: error (1) broken\n  \
             error status (1) returned by Kea with text: 'broken'"
        );
    }

    #[test]
    fn renders_options_and_option_data() {
        colored::control::set_override(false);
        let option = DhcpOptionData::new(3, Universe::V4)
            .with_field(DhcpOptionField::Ipv4Address(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(
            render_options(&[option]),
            "code=3 space=dhcp4 universe=IPv4 fields=[ipv4-address 192.0.2.1]"
        );

        let data = SingleOptionData {
            code: 3,
            space: "dhcp4".to_string(),
            data: "192.0.2.1".to_string(),
            ..SingleOptionData::default()
        };
        assert_eq!(
            render_option_data(&[data]),
            "code=3 space=dhcp4 csv-format=true data=\"192.0.2.1\""
        );
    }
}
