//! TypeScript helper bodies

use types::TargetLanguage;

use super::{HelperEmitter, HelperSnippet};

/// Built-in helpers of the TypeScript client.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptHelpers;

const NODE_CRYPTO: &str = r#"import { createHash } from "node:crypto";"#;
const ELLIPTIC: &str = r#"import { ec as EC } from "elliptic";"#;

impl HelperEmitter for TypeScriptHelpers {
    fn target(&self) -> TargetLanguage { TargetLanguage::TypeScript }

    fn builtin(&self, helper: &str) -> Option<HelperSnippet> {
        let snippet = match helper {
            "setNAGURL" => HelperSnippet::new("this.{{f:nagURL}} = {{p:url}};"),
            "getNAGURL" => HelperSnippet::new("return this.{{f:nagURL}};"),
            "setNAGKey" => HelperSnippet::new("this.{{f:nagKey}} = {{p:key}};"),
            "getNAGKey" => HelperSnippet::new("return this.{{f:nagKey}};"),
            "getError" => HelperSnippet::new("return this.{{f:lastError}};"),
            "getFormattedTimestamp" => HelperSnippet::new(
                r#"const _now = new Date();
const _pad = (n: number): string => String(n).padStart(2, "0");
return (
  `${_now.getUTCFullYear()}:${_pad(_now.getUTCMonth() + 1)}:${_pad(_now.getUTCDate())}` +
  `-${_pad(_now.getUTCHours())}:${_pad(_now.getUTCMinutes())}:${_pad(_now.getUTCSeconds())}`
);"#,
            ),
            "stringToHex" =>
                HelperSnippet::new(r#"return Buffer.from({{p:text}}, "utf8").toString("hex");"#),
            "hexToString" => HelperSnippet::new(
                r#"return Buffer.from(this.{{m:hexFix}}({{p:hex}}), "hex").toString("utf8");"#,
            ),
            "hexFix" => HelperSnippet::new(
                r#"return {{p:hex}}.startsWith("0x") || {{p:hex}}.startsWith("0X") ? {{p:hex}}.slice(2) : {{p:hex}};"#,
            ),
            "padNumber" => HelperSnippet::new(
                r#"return {{p:num}} < 10 ? "0" + String({{p:num}}) : String({{p:num}});"#,
            ),
            "hashString" => HelperSnippet::new(
                r#"return createHash("sha256").update({{p:text}}, "utf8").digest("hex");"#,
            )
            .with_imports(&[NODE_CRYPTO]),
            "getPublicKey" => HelperSnippet::new(
                r#"return new EC("secp256k1").keyFromPrivate(this.{{m:hexFix}}({{p:privateKey}}), "hex").getPublic("hex");"#,
            )
            .with_imports(&[ELLIPTIC]),
            "signMessage" => HelperSnippet::new(
                r#"const _key = new EC("secp256k1").keyFromPrivate(this.{{m:hexFix}}({{p:privateKey}}), "hex");
const _digest = createHash("sha256").update({{p:message}}, "utf8").digest("hex");
return _key.sign(_digest, { canonical: true }).toDER("hex");"#,
            )
            .with_imports(&[NODE_CRYPTO, ELLIPTIC]),
            "verifySignature" => HelperSnippet::new(
                r#"try {
  const _key = new EC("secp256k1").keyFromPublic(this.{{m:hexFix}}({{p:publicKey}}), "hex");
  const _digest = createHash("sha256").update({{p:message}}, "utf8").digest("hex");
  return _key.verify(_digest, this.{{m:hexFix}}({{p:signature}}));
} catch {
  return false;
}"#,
            )
            .with_imports(&[NODE_CRYPTO, ELLIPTIC]),
            _ => return None,
        };
        Some(snippet)
    }
}
