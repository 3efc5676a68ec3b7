//! `go test` suite and parity driver

use std::fmt::{self, Write};

use codegen::{ClientModel, MethodModel};
use types::TargetLanguage;

use super::{endpoint_cases, helper_cases, integration_test_name, provenance, unit_test_name, Argument, SuiteRenderer};
use crate::literal::{go, quote};
use crate::{MOCK_URL_ENV, PARITY_ENDPOINT_ENV, PARITY_MARKER, PARITY_REQUEST_ENV};

/// Renders the Go suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoSuite;

const SUPPORT: &str = r#"
func ptr[T any](v T) *T {
	return &v
}

func decode[T any](t *testing.T, text string) T {
	t.Helper()
	var v T
	if err := json.Unmarshal([]byte(text), &v); err != nil {
		t.Fatalf("decode %s: %v", text, err)
	}
	return v
}

func normalized(t *testing.T, v interface{}) interface{} {
	t.Helper()
	raw, err := json.Marshal(v)
	if err != nil {
		t.Fatalf("encode: %v", err)
	}
	return decode[interface{}](t, string(raw))
}

func expectJSON(t *testing.T, actual interface{}, expectedText string) {
	t.Helper()
	want := decode[interface{}](t, expectedText)
	if got := normalized(t, actual); !reflect.DeepEqual(got, want) {
		t.Fatalf("got %v, want %v", got, want)
	}
}

func expectFields(t *testing.T, actual interface{}, expectedText string, fields []string) {
	t.Helper()
	if len(fields) == 0 {
		expectJSON(t, actual, expectedText)
		return
	}
	want := decode[map[string]interface{}](t, expectedText)
	got, ok := normalized(t, actual).(map[string]interface{})
	if !ok {
		t.Fatalf("got %v, want a record", actual)
	}
	for _, field := range fields {
		value, present := got[field]
		if !present {
			t.Fatalf("missing field %s", field)
		}
		if !reflect.DeepEqual(value, want[field]) {
			t.Fatalf("%s: got %v, want %v", field, value, want[field])
		}
	}
}
"#;

fn arguments(args: &[Argument<'_>]) -> String {
    args.iter()
        .map(|a| match (a.value, a.param.required) {
            (Some(v), true) => go(v, &a.param.inner_token),
            (Some(v), false) => format!("ptr({})", go(v, &a.param.inner_token)),
            (None, _) => "nil".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn header(buf: &mut String, title: &str, model: &ClientModel) -> fmt::Result {
    writeln!(buf, "// {}", title)?;
    writeln!(buf, "//")?;
    writeln!(buf, "// {}", provenance(model))?;
    writeln!(buf, "package circular")?;
    writeln!(buf)
}

fn parity_call(method: &MethodModel) -> String {
    let args: Vec<String> = method
        .ordered_params()
        .iter()
        .map(|p| {
            let helper = if p.required { "arg" } else { "optArg" };
            format!("{}[{}](t, request, {})", helper, p.inner_token, quote(&p.wire_name))
        })
        .collect();
    format!("c.{}({})", method.ident, args.join(", "))
}

impl SuiteRenderer for GoSuite {
    fn target(&self) -> TargetLanguage { TargetLanguage::Go }

    fn render_suite(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        header(&mut buf, "Unit and integration tests of the Circular Protocol client.", model)?;
        writeln!(buf, "import (")?;
        for import in ["encoding/json", "net/http", "os", "reflect", "testing"] {
            writeln!(buf, "\t{}", quote(import))?;
        }
        writeln!(buf, ")")?;
        writeln!(buf)?;
        writeln!(buf, "var mockURL = os.Getenv({})", quote(MOCK_URL_ENV))?;
        writeln!(buf)?;
        writeln!(buf, "type mockTransport struct {{")?;
        writeln!(buf, "\turl string")?;
        writeln!(buf, "}}")?;
        writeln!(buf)?;
        writeln!(buf, "func (m *mockTransport) Post(_ string, body []byte) ([]byte, error) {{")?;
        writeln!(buf, "\treturn (&HTTPTransport{{Client: http.DefaultClient}}).Post(m.url, body)")?;
        writeln!(buf, "}}")?;
        buf.push_str(SUPPORT);
        writeln!(buf)?;
        writeln!(buf, "func requireMock(t *testing.T) *{} {{", model.class_name)?;
        writeln!(buf, "\tt.Helper()")?;
        writeln!(buf, "\tif mockURL == \"\" {{")?;
        writeln!(buf, "\t\tt.Skip({})", quote(&format!("{} is not set", MOCK_URL_ENV)))?;
        writeln!(buf, "\t}}")?;
        writeln!(buf, "\treturn New{}(&mockTransport{{url: mockURL}})", model.class_name)?;
        writeln!(buf, "}}")?;

        for case in helper_cases(model) {
            writeln!(buf)?;
            writeln!(
                buf,
                "func {}(t *testing.T) {{",
                unit_test_name(self.target(), &case.method.ident, case.index)
            )?;
            writeln!(buf, "\tc := New{}(nil)", model.class_name)?;
            let call = format!("c.{}({})", case.method.ident, arguments(&case.args));
            if case.method.is_fallible_helper() {
                writeln!(buf, "\tgot, err := {}", call)?;
                writeln!(buf, "\tif err != nil {{")?;
                writeln!(buf, "\t\tt.Fatal(err)")?;
                writeln!(buf, "\t}}")?;
            } else {
                writeln!(buf, "\tgot := {}", call)?;
            }
            writeln!(buf, "\texpectJSON(t, got, {})", quote(&case.expected.to_string()))?;
            writeln!(buf, "}}")?;
        }
        for case in endpoint_cases(model) {
            let fields: Vec<String> = case.fields.iter().map(|f| quote(f)).collect();
            writeln!(buf)?;
            writeln!(buf, "func {}(t *testing.T) {{", integration_test_name(self.target(), &case.method.ident))?;
            writeln!(buf, "\tc := requireMock(t)")?;
            writeln!(buf, "\tgot, err := c.{}({})", case.method.ident, arguments(&case.args))?;
            writeln!(buf, "\tif err != nil {{")?;
            writeln!(buf, "\t\tt.Fatal(err)")?;
            writeln!(buf, "\t}}")?;
            writeln!(
                buf,
                "\texpectFields(t, got, {}, []string{{{}}})",
                quote(&case.payload),
                fields.join(", ")
            )?;
            writeln!(buf, "}}")?;
        }
        Ok(buf)
    }

    fn render_driver(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        header(&mut buf, "Parity driver: one endpoint call against the mock.", model)?;
        writeln!(buf, "import (")?;
        for import in ["encoding/json", "errors", "fmt", "os", "testing"] {
            writeln!(buf, "\t{}", quote(import))?;
        }
        writeln!(buf, ")")?;
        writeln!(buf)?;
        writeln!(buf, "const parityMarker = {}", quote(PARITY_MARKER))?;
        buf.push_str(
            r#"
func arg[T any](t *testing.T, request map[string]json.RawMessage, name string) T {
	t.Helper()
	var v T
	if raw, ok := request[name]; ok {
		if err := json.Unmarshal(raw, &v); err != nil {
			t.Fatalf("argument %s: %v", name, err)
		}
	}
	return v
}

func optArg[T any](t *testing.T, request map[string]json.RawMessage, name string) *T {
	t.Helper()
	raw, ok := request[name]
	if !ok || string(raw) == "null" {
		return nil
	}
	v := arg[T](t, request, name)
	return &v
}
"#,
        );
        writeln!(buf)?;
        writeln!(
            buf,
            "func dispatchParity(t *testing.T, c *{}, endpoint string, request map[string]json.RawMessage) (interface{{}}, error) {{",
            model.class_name
        )?;
        writeln!(buf, "\tswitch endpoint {{")?;
        for method in model.endpoints() {
            writeln!(buf, "\tcase {}:", quote(&method.canonical))?;
            writeln!(buf, "\t\treturn {}", parity_call(method))?;
        }
        writeln!(buf, "\tdefault:")?;
        writeln!(buf, "\t\tt.Fatalf(\"unknown endpoint %s\", endpoint)")?;
        writeln!(buf, "\t\treturn nil, nil")?;
        writeln!(buf, "\t}}")?;
        writeln!(buf, "}}")?;
        writeln!(buf)?;
        writeln!(buf, "func TestParityDriver(t *testing.T) {{")?;
        writeln!(buf, "\tendpoint := os.Getenv({})", quote(PARITY_ENDPOINT_ENV))?;
        writeln!(buf, "\tif endpoint == \"\" {{")?;
        writeln!(buf, "\t\tt.Skip({})", quote(&format!("{} is not set", PARITY_ENDPOINT_ENV)))?;
        writeln!(buf, "\t}}")?;
        writeln!(buf, "\tvar request map[string]json.RawMessage")?;
        writeln!(buf, "\tif err := json.Unmarshal([]byte(os.Getenv({})), &request); err != nil {{", quote(PARITY_REQUEST_ENV))?;
        writeln!(buf, "\t\tt.Fatalf(\"request: %v\", err)")?;
        writeln!(buf, "\t}}")?;
        writeln!(buf, "\tc := New{}(&mockTransport{{url: os.Getenv({})}})", model.class_name, quote(MOCK_URL_ENV))?;
        buf.push_str(
            r#"	value, err := dispatchParity(t, c, endpoint, request)
	out := map[string]interface{}{"ok": true, "value": value}
	var failure *CircularError
	if errors.As(err, &failure) {
		out = map[string]interface{}{"ok": false, "code": failure.Code, "name": failure.Name}
	} else if err != nil {
		t.Fatal(err)
	}
	line, err := json.Marshal(out)
	if err != nil {
		t.Fatal(err)
	}
	fmt.Println(parityMarker + string(line))
}
"#,
        );
        Ok(buf)
    }
}
