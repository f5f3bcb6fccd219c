use serframe_frame::codec::frame_len_for_body;
use serframe_frame::{FrameWriter, MessageCatalog, MIN_START_BYTES};

use crate::catalog::load_catalog;
use crate::cmd::{parse_hex, EncodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_raw, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let body = parse_hex("body", &args.body)?;
    let catalog = load_catalog(args.catalog.as_deref())?;
    if !args.force {
        check_catalog(catalog.as_ref(), &body)?;
    }

    let wire = encode_wire(&body)?;

    match format {
        OutputFormat::Raw => print_raw(&wire),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "schema_id": "https://schemas.3leaps.dev/serframe/cli/v1/frame-encoded.schema.json",
                "id": body[0],
                "len": wire.len() - MIN_START_BYTES,
                "wire": hex::encode(&wire),
            })
        ),
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", hex::encode(&wire)),
    }
    Ok(SUCCESS)
}

fn encode_wire(body: &[u8]) -> CliResult<Vec<u8>> {
    let mut writer = FrameWriter::new(Vec::new());
    writer
        .send(body)
        .map_err(|err| frame_error("encode failed", err))?;
    Ok(writer.into_inner())
}

/// The receiver sizes the frame from its identifier, so the two must agree.
fn check_catalog(catalog: &dyn MessageCatalog, body: &[u8]) -> CliResult<()> {
    let Some(&id) = body.first() else {
        return Ok(());
    };
    let actual = frame_len_for_body(body.len());
    match catalog.size_of(id) {
        Some(expected) if expected == actual => Ok(()),
        Some(expected) => Err(CliError::new(
            USAGE,
            format!(
                "identifier 0x{id:02X} maps to {expected} bytes but the body encodes to {actual} (use --force to override)"
            ),
        )),
        None => Err(CliError::new(
            USAGE,
            format!("identifier 0x{id:02X} is not in the catalog (use --force to override)"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use serframe_frame::{IdentityCatalog, SizeTable};

    use super::*;

    #[test]
    fn identity_catalog_requires_matching_id() {
        let body = [0x0F, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04];
        assert!(check_catalog(&IdentityCatalog, &body).is_ok());

        let body = [0x10, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04];
        let err = check_catalog(&IdentityCatalog, &body).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn table_catalog_unknown_id() {
        let table: SizeTable = [(0x01, 10)].into_iter().collect();
        assert!(check_catalog(&table, &[0x01, 0, 0, 0]).is_ok());
        assert!(check_catalog(&table, &[0x02, 0, 0, 0]).is_err());
    }

    #[test]
    fn encodes_reference_frame() {
        let wire = encode_wire(&[0x0F, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04]).unwrap();
        assert_eq!(
            hex::encode(&wire),
            "ffffffffff0f010203fe01020304fe0e030107fe"
        );
    }

    #[test]
    fn rejects_ragged_body() {
        let err = encode_wire(&[0x0F, 0x01]).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
