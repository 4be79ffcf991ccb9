//! Wire codec
//!
//! Requests go out as `application/x-www-form-urlencoded` bodies. Responses
//! come back as a single XML element whose attributes carry every value,
//! e.g. `<IDP MSGTYPE="PayConfirm" ID="..." AMOUNT="1250" ... />`.

use crate::record::Fields;
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Form-encode all present fields as `name=value` pairs joined by `&`.
pub fn encode(fields: &Fields) -> Result<String> {
    Ok(serde_urlencoded::to_string(fields.as_map())?)
}

/// Decode the attributes of a single-element XML fragment.
///
/// Text and whitespace around the element are ignored. The fragment must hold
/// exactly one root element and that element must carry attributes.
pub fn decode(fragment: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_str(fragment);
    reader.config_mut().trim_text(true);

    let mut attributes = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                if depth == 0 {
                    take_root(&mut attributes, &element)?;
                }
                depth += 1;
            }
            Ok(Event::Empty(element)) => {
                if depth == 0 {
                    take_root(&mut attributes, &element)?;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::MalformedResponse("unexpected closing tag".to_string())
                })?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::MalformedResponse(format!(
                    "{} at position {}",
                    e,
                    reader.error_position()
                )))
            }
        }
    }

    if depth != 0 {
        return Err(Error::MalformedResponse("unclosed element".to_string()));
    }

    let attributes =
        attributes.ok_or_else(|| Error::MalformedResponse("no element found".to_string()))?;
    if attributes.is_empty() {
        return Err(Error::MalformedResponse(
            "element carries no attributes".to_string(),
        ));
    }

    Ok(attributes)
}

fn take_root(
    slot: &mut Option<BTreeMap<String, String>>,
    element: &BytesStart<'_>,
) -> Result<()> {
    if slot.is_some() {
        return Err(Error::MalformedResponse(
            "more than one root element".to_string(),
        ));
    }
    *slot = Some(read_attributes(element)?);
    Ok(())
}

fn read_attributes(element: &BytesStart<'_>) -> Result<BTreeMap<String, String>> {
    let mut attributes = BTreeMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::MalformedResponse(e.to_string()))?;
        let name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::MalformedResponse(e.to_string()))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(name, value);
    }
    Ok(attributes)
}
