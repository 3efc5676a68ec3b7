//! Single-file Java suite and parity driver
//!
//! Both are launched with `java <File>.java`, which compiles the SDK source
//! next to them. The suite takes a name prefix as its only argument.

use std::fmt::{self, Write};

use codegen::ClientModel;
use types::TargetLanguage;

use super::{endpoint_cases, helper_cases, integration_test_name, provenance, unit_test_name, Argument, SuiteRenderer};
use crate::literal::{java, quote};
use crate::{MOCK_URL_ENV, PARITY_ENDPOINT_ENV, PARITY_MARKER, PARITY_REQUEST_ENV};

/// Renders the Java suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaSuite;

const SUPPORT: &str = r#"
    @FunctionalInterface
    interface Check {
        void run() throws Exception;
    }

    static final class Skipped extends RuntimeException {
        Skipped(String message) {
            super(message);
        }
    }

    private static final Comparator<JsonNode> NUMERIC = (a, b) -> {
        if (a.isNumber() && b.isNumber()) {
            return a.decimalValue().compareTo(b.decimalValue());
        }
        return a.equals(b) ? 0 : 1;
    };

    static <T> T decode(String text, TypeReference<T> type) {
        try {
            return MAPPER.readValue(text, type);
        } catch (Exception e) {
            throw new IllegalStateException(e);
        }
    }

    static JsonNode tree(Object value) throws Exception {
        return MAPPER.readTree(MAPPER.writeValueAsString(value));
    }

    static void expectJSON(Object actual, String expectedText) throws Exception {
        JsonNode got = tree(actual);
        JsonNode want = MAPPER.readTree(expectedText);
        if (!got.equals(NUMERIC, want)) {
            throw new AssertionError("got " + got + ", want " + want);
        }
    }

    static void expectFields(Object actual, String expectedText, List<String> fields) throws Exception {
        if (fields.isEmpty()) {
            expectJSON(actual, expectedText);
            return;
        }
        JsonNode got = tree(actual);
        JsonNode want = MAPPER.readTree(expectedText);
        for (String field : fields) {
            if (!got.has(field)) {
                throw new AssertionError("missing field " + field);
            }
            if (!got.get(field).equals(NUMERIC, want.get(field))) {
                throw new AssertionError(field + ": got " + got.get(field) + ", want " + want.get(field));
            }
        }
    }
"#;

const RUN: &str = r#"
        String filter = args.length > 0 ? args[0] : "";
        int passed = 0;
        int failed = 0;
        int skipped = 0;
        for (Map.Entry<String, Check> entry : checks.entrySet()) {
            if (!entry.getKey().startsWith(filter)) {
                continue;
            }
            try {
                entry.getValue().run();
                passed++;
                System.out.println("PASS " + entry.getKey());
            } catch (Skipped e) {
                skipped++;
                System.out.println("SKIP " + entry.getKey() + ": " + e.getMessage());
            } catch (Throwable e) {
                failed++;
                System.out.println("FAIL " + entry.getKey() + ": " + e);
            }
        }
        System.out.printf("%d passed, %d failed, %d skipped%n", passed, failed, skipped);
        if (failed > 0) {
            System.exit(1);
        }
    }
}
"#;

fn arguments(args: &[Argument<'_>]) -> String {
    args.iter()
        .map(|a| a.value.map(|v| java(v, &a.param.inner_token)).unwrap_or_else(|| "null".into()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(items: &[String]) -> String {
    format!("List.of({})", items.iter().map(|i| quote(i)).collect::<Vec<_>>().join(", "))
}

fn header(buf: &mut String, title: &str, model: &ClientModel, imports: &[&str]) -> fmt::Result {
    writeln!(buf, "// {}", title)?;
    writeln!(buf, "//")?;
    writeln!(buf, "// {}", provenance(model))?;
    writeln!(buf)?;
    for import in imports {
        writeln!(buf, "import {};", import)?;
    }
    writeln!(buf)
}

impl SuiteRenderer for JavaSuite {
    fn target(&self) -> TargetLanguage { TargetLanguage::Java }

    fn render_suite(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        header(
            &mut buf,
            "Unit and integration tests of the Circular Protocol client.",
            model,
            &[
                "com.fasterxml.jackson.core.type.TypeReference",
                "com.fasterxml.jackson.databind.JsonNode",
                "com.fasterxml.jackson.databind.ObjectMapper",
                "java.util.Comparator",
                "java.util.LinkedHashMap",
                "java.util.List",
                "java.util.Map",
            ],
        )?;
        let class = &model.class_name;
        writeln!(buf, "public class {}Test {{", class)?;
        writeln!(buf, "    private static final ObjectMapper MAPPER = new ObjectMapper();")?;
        writeln!(buf, "    private static final String MOCK_URL = System.getenv({});", quote(MOCK_URL_ENV))?;
        buf.push_str(SUPPORT);
        writeln!(buf)?;
        writeln!(buf, "    static {} client() {{", class)?;
        writeln!(buf, "        return new {}();", class)?;
        writeln!(buf, "    }}")?;
        writeln!(buf)?;
        writeln!(buf, "    static {} mockClient() {{", class)?;
        writeln!(buf, "        if (MOCK_URL == null || MOCK_URL.isEmpty()) {{")?;
        writeln!(buf, "            throw new Skipped({});", quote(&format!("{} is not set", MOCK_URL_ENV)))?;
        writeln!(buf, "        }}")?;
        writeln!(buf, "        {}.HttpTransport http = new {}.HttpTransport();", class, class)?;
        writeln!(buf, "        return new {}((url, body) -> http.post(MOCK_URL, body));", class)?;
        writeln!(buf, "    }}")?;
        writeln!(buf)?;
        writeln!(buf, "    public static void main(String[] args) {{")?;
        writeln!(buf, "        Map<String, Check> checks = new LinkedHashMap<>();")?;
        for case in helper_cases(model) {
            writeln!(
                buf,
                "        checks.put({}, () -> expectJSON(client().{}({}), {}));",
                quote(&unit_test_name(self.target(), &case.method.ident, case.index)),
                case.method.ident,
                arguments(&case.args),
                quote(&case.expected.to_string())
            )?;
        }
        for case in endpoint_cases(model) {
            writeln!(
                buf,
                "        checks.put({}, () -> expectFields(mockClient().{}({}), {}, {}));",
                quote(&integration_test_name(self.target(), &case.method.ident)),
                case.method.ident,
                arguments(&case.args),
                quote(&case.payload),
                list(&case.fields)
            )?;
        }
        buf.push_str(RUN.trim_start_matches('\n'));
        Ok(buf)
    }

    fn render_driver(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut buf = String::new();
        header(
            &mut buf,
            "Parity driver: one endpoint call against the mock.",
            model,
            &[
                "com.fasterxml.jackson.databind.JsonNode",
                "com.fasterxml.jackson.databind.ObjectMapper",
                "com.fasterxml.jackson.databind.node.ObjectNode",
                "java.lang.reflect.InvocationTargetException",
                "java.lang.reflect.Method",
                "java.util.List",
                "java.util.Map",
            ],
        )?;
        let class = &model.class_name;
        writeln!(buf, "public class ParityDriver {{")?;
        writeln!(buf, "    private static final String MARKER = {};", quote(PARITY_MARKER))?;
        writeln!(buf, "    private static final ObjectMapper MAPPER = new ObjectMapper();")?;
        writeln!(buf)?;
        writeln!(buf, "    record Call(String method, List<String> params) {{}}")?;
        writeln!(buf)?;
        writeln!(buf, "    private static final Map<String, Call> METHODS = Map.ofEntries(")?;
        let entries: Vec<String> = model
            .endpoints()
            .map(|method| {
                let wire: Vec<String> = method.ordered_params().iter().map(|p| quote(&p.wire_name)).collect();
                format!(
                    "        Map.entry({}, new Call({}, List.of({})))",
                    quote(&method.canonical),
                    quote(&method.ident),
                    wire.join(", ")
                )
            })
            .collect();
        writeln!(buf, "{});", entries.join(",\n"))?;
        writeln!(buf)?;
        writeln!(buf, "    public static void main(String[] args) throws Exception {{")?;
        writeln!(buf, "        String url = System.getenv({});", quote(MOCK_URL_ENV))?;
        writeln!(buf, "        Call call = METHODS.get(System.getenv({}));", quote(PARITY_ENDPOINT_ENV))?;
        writeln!(buf, "        if (call == null) {{")?;
        writeln!(buf, "            throw new IllegalArgumentException(\"unknown endpoint\");")?;
        writeln!(buf, "        }}")?;
        writeln!(buf, "        JsonNode request = MAPPER.readTree(System.getenv({}));", quote(PARITY_REQUEST_ENV))?;
        writeln!(buf, "        {}.HttpTransport http = new {}.HttpTransport();", class, class)?;
        writeln!(buf, "        {} client = new {}((ignored, body) -> http.post(url, body));", class, class)?;
        writeln!(buf, "        Method target = null;")?;
        writeln!(buf, "        for (Method m : {}.class.getMethods()) {{", class)?;
        buf.push_str(
            r#"            if (m.getName().equals(call.method()) && m.getParameterCount() == call.params().size()) {
                target = m;
            }
        }
        if (target == null) {
            throw new IllegalStateException("no method " + call.method());
        }
        Class<?>[] types = target.getParameterTypes();
        Object[] values = new Object[types.length];
        for (int i = 0; i < values.length; i++) {
            JsonNode node = request.get(call.params().get(i));
            values[i] = node == null || node.isNull() ? null : MAPPER.convertValue(node, types[i]);
        }
        ObjectNode out = MAPPER.createObjectNode();
        try {
            Object value = target.invoke(client, values);
            out.put("ok", true);
            out.set("value", MAPPER.valueToTree(value));
"#,
        );
        writeln!(buf, "        }} catch (InvocationTargetException e) {{")?;
        writeln!(buf, "            if (!(e.getCause() instanceof {}.CircularException failure)) {{", class)?;
        buf.push_str(
            r#"                throw e;
            }
            out.put("ok", false);
            out.put("code", failure.getCode());
            out.put("name", failure.getErrorName());
        }
        System.out.println(MARKER + MAPPER.writeValueAsString(out));
    }
}
"#,
        );
        Ok(buf)
    }
}
