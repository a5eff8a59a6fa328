//! Integration tests running the routes in testdata/routes against the
//! sample messages in testdata/messages.

use chrono::{TimeZone, Utc};
use msgmap_codec::MessageFormat;
use msgmap_mapping::{MappingEngine, Mode, RouteLoader, RouteRegistry, Transformer};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn testdata() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../testdata")
}

fn message(name: &str) -> String {
    let path = testdata().join("messages").join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {}: {}", path.display(), err))
}

fn loader() -> RouteLoader {
    RouteLoader::new(testdata().join("routes"))
}

fn engine() -> MappingEngine {
    MappingEngine::with_transformer(Transformer::with_clock(|| {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap()
    }))
}

#[test]
fn test_all_fixture_routes_load() -> anyhow::Result<()> {
    let routes = loader().load_all()?;
    let ids: Vec<&str> = routes.iter().map(|r| r.route_id.as_str()).collect();
    assert_eq!(ids, vec!["credit-transfer", "legacy-soap", "prefixed-root"]);

    let legacy = routes.iter().find(|r| r.route_id == "legacy-soap").unwrap();
    assert_eq!(legacy.mode, Some(Mode::Active));
    assert_eq!(legacy.endpoint.as_deref(), Some("https://core.example.test/iso/status"));
    assert_eq!(legacy.auth.as_ref().map(|a| a.auth_type.as_str()), Some("API_KEY"));
    Ok(())
}

#[test]
fn test_credit_transfer_request() {
    let config = loader().load("credit-transfer").unwrap();
    let xml = engine()
        .transform_to_target(&message("credit-transfer.json"), &config)
        .unwrap();

    let expected = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<Document xmlns=\"urn:iso:std:iso:20022:tech:xsd:pacs.008.001.08\"><FIToFICstmrCdtTrf>",
        "<GrpHdr><MsgId>MSG-20240307-0001</MsgId><CreDtTm>2024-03-07T09:30:00</CreDtTm><NbOfTxs>1</NbOfTxs></GrpHdr>",
        "<CdtTrfTxInf><PmtId><EndToEndId>000000987654321</EndToEndId></PmtId>",
        "<IntrBkSttlmAmt>1500.00</IntrBkSttlmAmt><Ccy>EUR</Ccy>",
        "<Dbtr><Nm>ACME Trading Ltd</Nm></Dbtr><Cdtr><Nm>Globex Supplies</Nm></Cdtr>",
        "<CdtrAcct><Id><IBAN>DE89370400440532013000</IBAN></Id></CdtrAcct>",
        "<Purp><Cd>SUPP</Cd></Purp></CdtTrfTxInf>",
        "</FIToFICstmrCdtTrf></Document>",
    );
    assert_eq!(xml, expected);
}

#[test]
fn test_credit_transfer_json_reply() {
    let config = loader().load("credit-transfer").unwrap();
    let json = engine()
        .transform_from_target(&message("pacs002-reply.xml"), &config, MessageFormat::Json)
        .unwrap();

    let reply: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        reply,
        serde_json::json!({
            "result": {"responseCode": "25", "reference": "STS-20240307-0001"},
            "status": "PROCESSED"
        })
    );
}

#[test]
fn test_legacy_soap_request() {
    let config = loader().load("legacy-soap").unwrap();
    let xml = engine()
        .transform_to_target(&message("legacy-query.xml"), &config)
        .unwrap();

    assert!(xml.ends_with(concat!(
        "<Document><StsReq>",
        "<GrpHdr><MsgId>SESS-42</MsgId><InstrId>LGCY-BANKKE-123456</InstrId></GrpHdr>",
        "<OrgnlTxRef><TxId>TXN0000123456</TxId></OrgnlTxRef>",
        "</StsReq></Document>",
    )), "{xml}");
}

#[test]
fn test_legacy_soap_xml_reply() {
    let config = loader().load("legacy-soap").unwrap();
    let xml = engine()
        .transform_from_target(&message("legacy-reply.xml"), &config, MessageFormat::Soap)
        .unwrap();

    assert!(xml.ends_with(concat!(
        "<TSQuerySingleResponse><SessionID>SESS-42</SessionID>",
        "<ResponseCode>99</ResponseCode><Status>COMPLETED</Status></TSQuerySingleResponse>",
    )), "{xml}");
}

#[test]
fn test_prefixed_root_request() {
    let config = loader().load("prefixed-root").unwrap();
    let xml = engine()
        .transform_to_target(&message("statement.xml"), &config)
        .unwrap();

    assert!(xml.contains(
        "<ns:Document xmlns:ns=\"urn:iso:std:iso:20022:tech:xsd:camt.053.001.08\"><BkToCstmrStmt>"
    ), "{xml}");
    assert!(xml.contains("<GrpHdr><MsgId>STMT-0042</MsgId></GrpHdr>"));
    assert!(xml.contains("<Acct><Id><Othr><Id>12345678</Id></Othr></Id></Acct>"));
    assert!(xml.ends_with("<Bal><Amt>2500.75</Amt></Bal></Stmt></BkToCstmrStmt></ns:Document>"));
}

#[test]
fn test_shared_config_across_threads() {
    let registry = Arc::new(RouteRegistry::new(loader()));
    let engine = Arc::new(engine());
    let input = Arc::new(message("credit-transfer.json"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let engine = Arc::clone(&engine);
            let input = Arc::clone(&input);
            thread::spawn(move || {
                let config = registry.get_or_load("credit-transfer").unwrap();
                engine.transform_to_target(&input, &config).unwrap()
            })
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(registry.len(), 1);
}
