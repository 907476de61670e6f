use super::definition::OptionDefinitionLookup;
use super::field::{encode_field, infer_field, parse_field, split_csv, DhcpOptionField, OptionType};
use super::{
    DaemonId, DhcpOption, DhcpOptionData, OptionError, SingleOptionData, Universe,
    DHCP4_OPTION_SPACE, DHCP6_OPTION_SPACE,
};

/// Convert a field-typed option into a Kea `option-data` item.
///
/// Options with a known definition are rendered as comma separated values
/// with `csv-format` set. Options without one are rendered as a single string
/// of hex digits, all fields concatenated. Any field that cannot be converted
/// fails the whole option.
pub fn create_single_option_data(
    daemon: Option<DaemonId>,
    lookup: &dyn OptionDefinitionLookup,
    option: &dyn DhcpOption,
) -> Result<SingleOptionData, OptionError> {
    let csv_format = lookup.definition_exists(daemon, option);
    let converted = option
        .fields()
        .iter()
        .map(|field| encode_field(field, csv_format))
        .collect::<Result<Vec<_>, _>>()?;

    let data = if csv_format {
        converted.join(",")
    } else {
        converted.concat()
    };

    Ok(SingleOptionData {
        always_send: option.always_send(),
        code: option.code(),
        csv_format,
        data,
        name: option.name().to_string(),
        space: option.space().to_string(),
    })
}

/// Convert a Kea `option-data` item into a field-typed option.
///
/// CSV data is split and decoded field by field, following the definition
/// when one is known and inferring field types otherwise. Hex data becomes a
/// single hex-bytes field.
pub fn create_dhcp_option(
    option_data: &SingleOptionData,
    universe: Universe,
    lookup: &dyn OptionDefinitionLookup,
) -> Result<DhcpOptionData, OptionError> {
    let mut option = DhcpOptionData {
        always_send: option_data.always_send,
        code: option_data.code,
        encapsulate: String::new(),
        fields: Vec::new(),
        name: option_data.name.clone(),
        space: option_data.space.clone(),
        universe,
    };

    let definition = lookup.find(None, &option);
    option.encapsulate = match definition {
        Some(definition) => definition.encapsulate.clone(),
        None => synthetic_encapsulate(&option.space, option.code),
    };

    let data = option_data.data.trim();
    if data.is_empty() || definition.is_some_and(|d| d.option_type == OptionType::Empty) {
        return Ok(option);
    }

    if option_data.csv_format {
        for (index, token) in split_csv(data).iter().enumerate() {
            let field = match definition {
                Some(definition) => match definition.field_type(index) {
                    Some(field_type) => parse_field(field_type, token)?,
                    None => break,
                },
                None => infer_field(token),
            };
            option.fields.push(field);
        }
        return Ok(option);
    }

    let digits: String = data
        .chars()
        .filter(|c| *c != ' ' && *c != ':')
        .collect();
    option.fields.push(DhcpOptionField::HexBytes(digits));
    Ok(option)
}

/// Encapsulated space name for an option without a definition. Keeps ad-hoc
/// spaces apart from those declared by the daemon.
fn synthetic_encapsulate(space: &str, code: u16) -> String {
    match space {
        DHCP4_OPTION_SPACE | DHCP6_OPTION_SPACE => format!("option-{code}"),
        _ => format!("{space}.{code}"),
    }
}
