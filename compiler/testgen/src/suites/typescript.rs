//! node:test suite and parity driver

use std::fmt::{self, Write};

use codegen::ClientModel;
use types::TargetLanguage;

use super::{
    endpoint_cases, helper_cases, integration_test_name, provenance, sdk_module, unit_test_name, Argument,
    SuiteRenderer,
};
use crate::literal::{quote, typescript};
use crate::{MOCK_URL_ENV, PARITY_ENDPOINT_ENV, PARITY_MARKER, PARITY_REQUEST_ENV};

/// Renders the TypeScript suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptSuite;

const SUPPORT: &str = r#"
function plain(value: unknown): unknown {
  return value === undefined ? null : JSON.parse(JSON.stringify(value));
}

function expectJSON(actual: unknown, expectedText: string): void {
  assert.deepStrictEqual(plain(actual), JSON.parse(expectedText));
}

function expectFields(actual: unknown, expectedText: string, fields: string[]): void {
  if (fields.length === 0) {
    expectJSON(actual, expectedText);
    return;
  }
  const expected = JSON.parse(expectedText) as Record<string, unknown>;
  const record = actual as Record<string, unknown>;
  for (const field of fields) {
    assert.ok(field in record, `missing field ${field}`);
    assert.deepStrictEqual(plain(record[field]), expected[field], field);
  }
}

function unwrap<T>(result: Result<T>): T {
  if (!result.ok) {
    throw result.error;
  }
  return result.value;
}
"#;

fn arguments(args: &[Argument<'_>]) -> String {
    args.iter()
        .map(|a| a.value.map(typescript).unwrap_or_else(|| "undefined".into()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(items: &[String]) -> String {
    format!("[{}]", items.iter().map(|i| quote(i)).collect::<Vec<_>>().join(", "))
}

fn header(buf: &mut String, title: &str, model: &ClientModel) -> fmt::Result {
    writeln!(buf, "/**")?;
    writeln!(buf, " * {}", title)?;
    writeln!(buf, " *")?;
    writeln!(buf, " * {}", provenance(model))?;
    writeln!(buf, " */")
}

impl SuiteRenderer for TypeScriptSuite {
    fn target(&self) -> TargetLanguage { TargetLanguage::TypeScript }

    fn render_suite(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        header(&mut buf, "Unit and integration tests of the Circular Protocol client.", model)?;
        writeln!(buf, "import {{ test }} from \"node:test\";")?;
        writeln!(buf, "import assert from \"node:assert/strict\";")?;
        writeln!(buf)?;
        writeln!(
            buf,
            "import {{ {}, fetchTransport, type Result }} from \"./{}\";",
            model.class_name,
            sdk_module(self.target())
        )?;
        writeln!(buf)?;
        writeln!(buf, "const MOCK_URL = process.env[{}];", quote(MOCK_URL_ENV))?;
        writeln!(
            buf,
            "const requiresMock = {{ skip: MOCK_URL ? false : {} }};",
            quote(&format!("{} is not set", MOCK_URL_ENV))
        )?;
        buf.push_str(SUPPORT);
        writeln!(buf)?;
        writeln!(buf, "function client(): {} {{", model.class_name)?;
        writeln!(buf, "  return new {}();", model.class_name)?;
        writeln!(buf, "}}")?;
        writeln!(buf)?;
        writeln!(buf, "function mockClient(): {} {{", model.class_name)?;
        writeln!(buf, "  return new {}((_url, body) => fetchTransport(MOCK_URL ?? \"\", body));", model.class_name)?;
        writeln!(buf, "}}")?;

        for case in helper_cases(model) {
            writeln!(buf)?;
            writeln!(
                buf,
                "test({}, () => {{",
                quote(&unit_test_name(self.target(), &case.method.ident, case.index))
            )?;
            writeln!(
                buf,
                "  expectJSON(client().{}({}), {});",
                case.method.ident,
                arguments(&case.args),
                quote(&case.expected.to_string())
            )?;
            writeln!(buf, "}});")?;
        }
        for case in endpoint_cases(model) {
            writeln!(buf)?;
            writeln!(
                buf,
                "test({}, requiresMock, async () => {{",
                quote(&integration_test_name(self.target(), &case.method.ident))
            )?;
            writeln!(
                buf,
                "  const _result = unwrap(await mockClient().{}({}));",
                case.method.ident,
                arguments(&case.args)
            )?;
            writeln!(buf, "  expectFields(_result, {}, {});", quote(&case.payload), list(&case.fields))?;
            writeln!(buf, "}});")?;
        }
        Ok(buf)
    }

    fn render_driver(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        header(&mut buf, "Parity driver: one endpoint call against the mock.", model)?;
        writeln!(
            buf,
            "import {{ {}, fetchTransport }} from \"./{}\";",
            model.class_name,
            sdk_module(self.target())
        )?;
        writeln!(buf)?;
        writeln!(buf, "const MARKER = {};", quote(PARITY_MARKER))?;
        writeln!(buf)?;
        writeln!(buf, "const METHODS: Record<string, [string, string[]]> = {{")?;
        for method in model.endpoints() {
            let wire: Vec<String> = method.ordered_params().iter().map(|p| quote(&p.wire_name)).collect();
            writeln!(buf, "  {}: [{}, [{}]],", quote(&method.canonical), quote(&method.ident), wire.join(", "))?;
        }
        writeln!(buf, "}};")?;
        writeln!(buf)?;
        writeln!(buf, "type Invocation = (...args: unknown[]) => Promise<{{ ok: boolean; value?: unknown; error?: {{ code: number; errorName: string }} }}>;")?;
        writeln!(buf)?;
        writeln!(buf, "async function main(): Promise<void> {{")?;
        writeln!(buf, "  const url = process.env[{}] ?? \"\";", quote(MOCK_URL_ENV))?;
        writeln!(buf, "  const endpoint = process.env[{}] ?? \"\";", quote(PARITY_ENDPOINT_ENV))?;
        writeln!(
            buf,
            "  const request = JSON.parse(process.env[{}] ?? \"{{}}\") as Record<string, unknown>;",
            quote(PARITY_REQUEST_ENV)
        )?;
        writeln!(buf, "  const client = new {}((_url, body) => fetchTransport(url, body));", model.class_name)?;
        buf.push_str(
            r#"  const [ident, wire] = METHODS[endpoint];
  const method = (client as unknown as Record<string, Invocation>)[ident];
  const result = await method.apply(client, wire.map((name) => request[name]));
  const out = result.ok
    ? { ok: true, value: result.value ?? null }
    : { ok: false, code: result.error?.code, name: result.error?.errorName };
  console.log(MARKER + JSON.stringify(out));
}

main().catch((err: unknown) => {
  console.error(err);
  process.exit(1);
});
"#,
        );
        Ok(buf)
    }
}
