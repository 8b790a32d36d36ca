//! Response body → raw table.
//!
//! Service responses are .NET DataSet diffgrams (or plain XML documents for a
//! few methods). Every element named after the endpoint's row tag is one row.
//! Its attributes (`diffgr:id`, `msdata:rowOrder`) and child elements become
//! columns, by local name, in first-seen order.

use roxmltree::{Document, Node};

use crate::error::FetchError;
use crate::frame::{Cell, Frame};

/// Collect the rows tagged `row_tag` into a positional table.
///
/// A field absent from some rows is null there. A body without any matching
/// row is an empty table.
pub fn parse_rows(body: &str, row_tag: &str) -> Result<Frame, FetchError> {
    let doc = Document::parse(body)
        .map_err(|e| FetchError::ResponseFormatChanged(format!("malformed XML: {e}")))?;

    let mut columns: Vec<(String, Vec<Cell>)> = Vec::new();
    let mut height = 0;

    for row in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == row_tag)
    {
        for (name, cell) in row_fields(row) {
            let cells = match columns.iter().position(|(c, _)| *c == name) {
                Some(i) => &mut columns[i].1,
                None => {
                    columns.push((name, vec![Cell::Null; height]));
                    let last = columns.len() - 1;
                    &mut columns[last].1
                }
            };
            // A repeated field within one row keeps its first value.
            if cells.len() == height {
                cells.push(cell);
            }
        }
        height += 1;
        for (_, cells) in &mut columns {
            cells.resize(height, Cell::Null);
        }
    }

    Frame::from_columns(columns).map_err(|e| FetchError::ResponseFormatChanged(e.to_string()))
}

fn row_fields<'a>(row: Node<'a, 'a>) -> impl Iterator<Item = (String, Cell)> + 'a {
    let attributes = row
        .attributes()
        .map(|a| (a.name().to_string(), Cell::infer(a.value())));
    let children = row.children().filter(Node::is_element).map(|child| {
        (
            child.tag_name().name().to_string(),
            Cell::infer(child.text().unwrap_or("")),
        )
    });
    attributes.chain(children)
}

/// The `faultstring` of a SOAP fault, if the body is one.
pub fn soap_fault(body: &str) -> Option<String> {
    let doc = Document::parse(body).ok()?;
    let fault = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault")?;
    let message = fault
        .descendants()
        .find(|n| n.is_element() && matches!(n.tag_name().name(), "faultstring" | "Text"))
        .and_then(|n| n.text())
        .unwrap_or("unknown fault");
    Some(message.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_RATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <KeyRateResponse xmlns="http://web.cbr.ru/">
      <KeyRateResult>
        <diffgr:diffgram xmlns:msdata="urn:schemas-microsoft-com:xml-msdata" xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1">
          <KeyRate xmlns="">
            <KR diffgr:id="KR1" msdata:rowOrder="0">
              <DT>2020-01-09T00:00:00+03:00</DT>
              <Rate>6.25</Rate>
            </KR>
            <KR diffgr:id="KR2" msdata:rowOrder="1">
              <DT>2020-01-10T00:00:00+03:00</DT>
              <Rate>6.25</Rate>
            </KR>
          </KeyRate>
        </diffgr:diffgram>
      </KeyRateResult>
    </KeyRateResponse>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn diffgram_rows_become_columns() {
        let frame = parse_rows(KEY_RATE, "KR").unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(frame.names(), vec!["id", "rowOrder", "DT", "Rate"]);
        assert_eq!(frame.column("rowOrder").unwrap(), &[Cell::Int(0), Cell::Int(1)]);
        assert_eq!(frame.column("Rate").unwrap(), &[Cell::Float(6.25), Cell::Float(6.25)]);
        assert_eq!(
            frame.column("DT").unwrap()[0],
            Cell::Text("2020-01-09T00:00:00+03:00".into())
        );
    }

    #[test]
    fn absent_fields_are_null() {
        let body = r#"<r><ro><D0>2020-01-09</D0><ruo>6.1</ruo></ro><ro><D0>2020-01-10</D0><vol>10</vol></ro></r>"#;
        let frame = parse_rows(body, "ro").unwrap();
        assert_eq!(frame.names(), vec!["D0", "ruo", "vol"]);
        assert_eq!(frame.column("ruo").unwrap(), &[Cell::Float(6.1), Cell::Null]);
        assert_eq!(frame.column("vol").unwrap(), &[Cell::Null, Cell::Int(10)]);
    }

    #[test]
    fn no_matching_rows_is_an_empty_table() {
        let frame = parse_rows("<KeyRate/>", "KR").unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn malformed_body_is_a_format_error() {
        assert!(matches!(
            parse_rows("<KR>", "KR").unwrap_err(),
            FetchError::ResponseFormatChanged(_)
        ));
    }

    #[test]
    fn fault_string_is_extracted() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring> Server was unable to process request. </faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
        assert_eq!(
            soap_fault(body).as_deref(),
            Some("Server was unable to process request.")
        );
        assert_eq!(soap_fault(KEY_RATE), None);
    }
}
