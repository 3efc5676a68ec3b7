//! pytest suite and parity driver

use std::fmt::{self, Write};

use codegen::ClientModel;
use types::TargetLanguage;

use super::{
    endpoint_cases, helper_cases, integration_test_name, provenance, sdk_module, unit_test_name, Argument,
    SuiteRenderer,
};
use crate::literal::{python, quote};
use crate::{MOCK_URL_ENV, PARITY_ENDPOINT_ENV, PARITY_MARKER, PARITY_REQUEST_ENV};

/// Renders the Python suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonSuite;

fn positional(args: &[Argument<'_>]) -> String {
    args.iter().map(|a| a.value.map(python).unwrap_or_else(|| "None".into())).collect::<Vec<_>>().join(", ")
}

fn keywords(args: &[Argument<'_>]) -> String {
    args.iter()
        .filter_map(|a| a.value.map(|v| format!("{}={}", a.param.ident, python(v))))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(items: &[String]) -> String {
    format!("[{}]", items.iter().map(|i| quote(i)).collect::<Vec<_>>().join(", "))
}

impl SuiteRenderer for PythonSuite {
    fn target(&self) -> TargetLanguage { TargetLanguage::Python }

    fn render_suite(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        writeln!(buf, "\"\"\"Unit and integration tests of the Circular Protocol client.")?;
        writeln!(buf)?;
        writeln!(buf, "{}", provenance(model))?;
        writeln!(buf, "\"\"\"")?;
        writeln!(buf)?;
        writeln!(buf, "import json")?;
        writeln!(buf, "import os")?;
        writeln!(buf)?;
        writeln!(buf, "import pytest")?;
        writeln!(buf)?;
        writeln!(buf, "from {} import {}, urllib_transport", sdk_module(self.target()), model.class_name)?;
        writeln!(buf)?;
        writeln!(buf, "MOCK_URL = os.environ.get({})", quote(MOCK_URL_ENV))?;
        writeln!(
            buf,
            "requires_mock = pytest.mark.skipif(not MOCK_URL, reason={})",
            quote(&format!("{} is not set", MOCK_URL_ENV))
        )?;
        buf.push_str(
            r#"

def _plain(value):
    return json.loads(json.dumps(value))


def _expect(actual, expected_text):
    assert _plain(actual) == json.loads(expected_text)


def _expect_fields(actual, expected_text, fields):
    if not fields:
        _expect(actual, expected_text)
        return
    expected = json.loads(expected_text)
    for field in fields:
        assert field in actual, f"missing field {field}"
        assert _plain(actual[field]) == expected[field], field

"#,
        );
        writeln!(buf)?;
        writeln!(buf, "@pytest.fixture")?;
        writeln!(buf, "def client():")?;
        writeln!(buf, "    return {}()", model.class_name)?;
        writeln!(buf)?;
        writeln!(buf)?;
        writeln!(buf, "@pytest.fixture")?;
        writeln!(buf, "def mock_client():")?;
        writeln!(buf, "    return {}(lambda _url, body: urllib_transport(MOCK_URL, body))", model.class_name)?;

        for case in helper_cases(model) {
            writeln!(buf)?;
            writeln!(buf)?;
            writeln!(buf, "def {}(client):", unit_test_name(self.target(), &case.method.ident, case.index))?;
            writeln!(
                buf,
                "    _expect(client.{}({}), {})",
                case.method.ident,
                positional(&case.args),
                quote(&case.expected.to_string())
            )?;
        }
        for case in endpoint_cases(model) {
            writeln!(buf)?;
            writeln!(buf)?;
            writeln!(buf, "@requires_mock")?;
            writeln!(buf, "def {}(mock_client):", integration_test_name(self.target(), &case.method.ident))?;
            writeln!(buf, "    _result = mock_client.{}({})", case.method.ident, keywords(&case.args))?;
            writeln!(buf, "    _expect_fields(_result, {}, {})", quote(&case.payload), list(&case.fields))?;
        }
        Ok(buf)
    }

    fn render_driver(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        writeln!(buf, "\"\"\"Parity driver: one endpoint call against the mock.")?;
        writeln!(buf)?;
        writeln!(buf, "{}", provenance(model))?;
        writeln!(buf, "\"\"\"")?;
        writeln!(buf)?;
        writeln!(buf, "import json")?;
        writeln!(buf, "import os")?;
        writeln!(buf)?;
        writeln!(
            buf,
            "from {} import CircularError, {}, urllib_transport",
            sdk_module(self.target()),
            model.class_name
        )?;
        writeln!(buf)?;
        writeln!(buf, "MARKER = {}", quote(PARITY_MARKER))?;
        writeln!(buf)?;
        writeln!(buf, "METHODS = {{")?;
        for method in model.endpoints() {
            let params: Vec<String> =
                method.params.iter().map(|p| format!("{}: {}", quote(&p.wire_name), quote(&p.ident))).collect();
            writeln!(
                buf,
                "    {}: ({}, {{{}}}),",
                quote(&method.canonical),
                quote(&method.ident),
                params.join(", ")
            )?;
        }
        writeln!(buf, "}}")?;
        writeln!(buf)?;
        writeln!(buf)?;
        writeln!(buf, "def main():")?;
        writeln!(buf, "    url = os.environ[{}]", quote(MOCK_URL_ENV))?;
        writeln!(buf, "    endpoint = os.environ[{}]", quote(PARITY_ENDPOINT_ENV))?;
        writeln!(buf, "    request = json.loads(os.environ[{}])", quote(PARITY_REQUEST_ENV))?;
        writeln!(buf, "    client = {}(lambda _url, body: urllib_transport(url, body))", model.class_name)?;
        buf.push_str(
            r#"    ident, params = METHODS[endpoint]
    kwargs = {params[key]: value for key, value in request.items() if key in params}
    try:
        out = {"ok": True, "value": getattr(client, ident)(**kwargs)}
    except CircularError as exc:
        out = {"ok": False, "code": exc.code, "name": exc.name}
    print(MARKER + json.dumps(out), flush=True)


if __name__ == "__main__":
    main()
"#,
        );
        Ok(buf)
    }
}
