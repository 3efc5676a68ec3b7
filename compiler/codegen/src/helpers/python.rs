//! Python helper bodies

use types::TargetLanguage;

use super::{HelperEmitter, HelperSnippet};

/// Built-in helpers of the Python client.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonHelpers;

const HASHLIB: &[&str] = &["import hashlib"];

impl HelperEmitter for PythonHelpers {
    fn target(&self) -> TargetLanguage { TargetLanguage::Python }

    fn builtin(&self, helper: &str) -> Option<HelperSnippet> {
        let snippet = match helper {
            "setNAGURL" => HelperSnippet::new("self.{{f:nagURL}} = {{p:url}}"),
            "getNAGURL" => HelperSnippet::new("return self.{{f:nagURL}}"),
            "setNAGKey" => HelperSnippet::new("self.{{f:nagKey}} = {{p:key}}"),
            "getNAGKey" => HelperSnippet::new("return self.{{f:nagKey}}"),
            "getError" => HelperSnippet::new("return self.{{f:lastError}}"),
            "getFormattedTimestamp" => HelperSnippet::new(
                r#"return datetime.datetime.now(datetime.timezone.utc).strftime("%Y:%m:%d-%H:%M:%S")"#,
            )
            .with_imports(&["import datetime"]),
            "stringToHex" => HelperSnippet::new(r#"return {{p:text}}.encode("utf-8").hex()"#),
            "hexToString" => HelperSnippet::new(
                r#"return bytes.fromhex(self.{{m:hexFix}}({{p:hex}})).decode("utf-8")"#,
            ),
            "hexFix" => HelperSnippet::new(
                r#"if {{p:hex}}.startswith(("0x", "0X")):
    return {{p:hex}}[2:]
return {{p:hex}}"#,
            ),
            "padNumber" => HelperSnippet::new(
                r#"if {{p:num}} < 10:
    return "0" + str({{p:num}})
return str({{p:num}})"#,
            ),
            "hashString" => HelperSnippet::new(
                r#"return hashlib.sha256({{p:text}}.encode("utf-8")).hexdigest()"#,
            )
            .with_imports(HASHLIB),
            "getPublicKey" => HelperSnippet::new(
                r#"from ecdsa import SECP256k1, SigningKey

_key = SigningKey.from_string(bytes.fromhex(self.{{m:hexFix}}({{p:privateKey}})), curve=SECP256k1)
return "04" + _key.get_verifying_key().to_string().hex()"#,
            ),
            "signMessage" => HelperSnippet::new(
                r#"from ecdsa import SECP256k1, SigningKey
from ecdsa.util import sigencode_der_canonize

_key = SigningKey.from_string(bytes.fromhex(self.{{m:hexFix}}({{p:privateKey}})), curve=SECP256k1)
_digest = hashlib.sha256({{p:message}}.encode("utf-8")).digest()
return _key.sign_digest_deterministic(
    _digest, hashfunc=hashlib.sha256, sigencode=sigencode_der_canonize
).hex()"#,
            )
            .with_imports(HASHLIB),
            "verifySignature" => HelperSnippet::new(
                r#"from ecdsa import BadSignatureError, SECP256k1, VerifyingKey
from ecdsa.util import sigdecode_der

_digest = hashlib.sha256({{p:message}}.encode("utf-8")).digest()
try:
    _key = VerifyingKey.from_string(bytes.fromhex(self.{{m:hexFix}}({{p:publicKey}})), curve=SECP256k1)
    return _key.verify_digest(
        bytes.fromhex(self.{{m:hexFix}}({{p:signature}})), _digest, sigdecode=sigdecode_der
    )
except (BadSignatureError, ValueError):
    return False"#,
            )
            .with_imports(HASHLIB),
            _ => return None,
        };
        Some(snippet)
    }
}
