use anyhow::{bail, Context, Result};
use kea_protocol::{
    unmarshal_response_list, Command, HashedResponse, Response, SerializableCommand,
};
use keactl::report::{render_responses, ResponseSummary};

use crate::cli::{OutputFormat, ResponsesArgs};
use crate::input::{inline_or_file, read_input};

pub fn run_responses(args: ResponsesArgs) -> Result<()> {
    let command = Command::from_json(&inline_or_file(&args.command)?)
        .context("invalid --command")?;
    let reply = read_input(&args.reply)?;

    let rows: Vec<ResponseSummary> = if args.hash {
        let parsed: Vec<HashedResponse> = unmarshal_response_list(&command, &reply)?;
        parsed
            .iter()
            .map(|response| ResponseSummary::new(response, response.arguments_hash.as_deref()))
            .collect()
    } else {
        let parsed: Vec<Response> = unmarshal_response_list(&command, &reply)?;
        parsed
            .iter()
            .map(|response| ResponseSummary::new(response, None))
            .collect()
    };

    let daemons = command.daemons().len();
    if daemons > 0 && rows.len() != daemons {
        tracing::warn!(
            command = command.name(),
            expected = daemons,
            received = rows.len(),
            "reply count does not match the daemons of the command"
        );
    }

    match args.format {
        OutputFormat::Text => println!("{}", render_responses(&rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }

    let failed = rows.iter().filter(|row| row.failed()).count();
    if args.strict && failed > 0 {
        bail!("strict mode failed: {failed} daemon(s) did not complete '{}'", command.name());
    }
    Ok(())
}
