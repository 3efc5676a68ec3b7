//! Go helper bodies
//!
//! `encoding/hex` is imported as `hexenc` so a parameter named `hex` cannot
//! shadow it.

use types::TargetLanguage;

use super::{HelperEmitter, HelperSnippet};

/// Built-in helpers of the Go client.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoHelpers;

const HEX: &str = r#"hexenc "encoding/hex""#;
const SHA256: &str = r#""crypto/sha256""#;
const SECP256K1: &str = r#""github.com/decred/dcrd/dcrec/secp256k1/v4""#;
const ECDSA: &str = r#""github.com/decred/dcrd/dcrec/secp256k1/v4/ecdsa""#;

impl HelperEmitter for GoHelpers {
    fn target(&self) -> TargetLanguage { TargetLanguage::Go }

    fn builtin(&self, helper: &str) -> Option<HelperSnippet> {
        let snippet = match helper {
            "setNAGURL" => HelperSnippet::new("c.{{f:nagURL}} = {{p:url}}"),
            "getNAGURL" => HelperSnippet::new("return c.{{f:nagURL}}"),
            "setNAGKey" => HelperSnippet::new("c.{{f:nagKey}} = {{p:key}}"),
            "getNAGKey" => HelperSnippet::new("return c.{{f:nagKey}}"),
            "getError" => HelperSnippet::new("return c.{{f:lastError}}"),
            "getFormattedTimestamp" =>
                HelperSnippet::new(r#"return time.Now().UTC().Format("2006:01:02-15:04:05")"#)
                    .with_imports(&[r#""time""#]),
            "stringToHex" => HelperSnippet::new("return hexenc.EncodeToString([]byte({{p:text}}))")
                .with_imports(&[HEX]),
            "hexToString" => HelperSnippet::new(
                r#"_raw, _err := hexenc.DecodeString(c.{{m:hexFix}}({{p:hex}}))
if _err != nil {
	return "", _err
}
return string(_raw), nil"#,
            )
            .with_imports(&[HEX])
            .fallible(),
            "hexFix" => HelperSnippet::new(
                r#"if strings.HasPrefix({{p:hex}}, "0x") || strings.HasPrefix({{p:hex}}, "0X") {
	return {{p:hex}}[2:]
}
return {{p:hex}}"#,
            )
            .with_imports(&[r#""strings""#]),
            "padNumber" => HelperSnippet::new(
                r#"if {{p:num}} < 10 {
	return fmt.Sprintf("0%d", {{p:num}})
}
return fmt.Sprintf("%d", {{p:num}})"#,
            )
            .with_imports(&[r#""fmt""#]),
            "hashString" => HelperSnippet::new(
                r#"_sum := sha256.Sum256([]byte({{p:text}}))
return hexenc.EncodeToString(_sum[:])"#,
            )
            .with_imports(&[HEX, SHA256]),
            "getPublicKey" => HelperSnippet::new(
                r#"_raw, _err := hexenc.DecodeString(c.{{m:hexFix}}({{p:privateKey}}))
if _err != nil {
	return "", _err
}
_key := secp256k1.PrivKeyFromBytes(_raw)
return hexenc.EncodeToString(_key.PubKey().SerializeUncompressed()), nil"#,
            )
            .with_imports(&[HEX, SECP256K1])
            .fallible(),
            "signMessage" => HelperSnippet::new(
                r#"_raw, _err := hexenc.DecodeString(c.{{m:hexFix}}({{p:privateKey}}))
if _err != nil {
	return "", _err
}
_digest := sha256.Sum256([]byte({{p:message}}))
_sig := ecdsa.Sign(secp256k1.PrivKeyFromBytes(_raw), _digest[:])
return hexenc.EncodeToString(_sig.Serialize()), nil"#,
            )
            .with_imports(&[HEX, SHA256, SECP256K1, ECDSA])
            .fallible(),
            "verifySignature" => HelperSnippet::new(
                r#"_pub, _err := hexenc.DecodeString(c.{{m:hexFix}}({{p:publicKey}}))
if _err != nil {
	return false
}
_key, _err := secp256k1.ParsePubKey(_pub)
if _err != nil {
	return false
}
_der, _err := hexenc.DecodeString(c.{{m:hexFix}}({{p:signature}}))
if _err != nil {
	return false
}
_sig, _err := ecdsa.ParseDERSignature(_der)
if _err != nil {
	return false
}
_digest := sha256.Sum256([]byte({{p:message}}))
return _sig.Verify(_digest[:], _key)"#,
            )
            .with_imports(&[HEX, SHA256, SECP256K1, ECDSA]),
            _ => return None,
        };
        Some(snippet)
    }
}
