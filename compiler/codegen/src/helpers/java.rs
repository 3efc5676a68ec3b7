//! Java helper bodies

use types::TargetLanguage;

use super::{HelperEmitter, HelperSnippet};

/// Built-in helpers of the Java client.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaHelpers;

const HEX: &[&str] = &["import java.nio.charset.StandardCharsets;", "import java.util.HexFormat;"];

const CURVE: &[&str] = &[
    "import java.math.BigInteger;",
    "import java.util.HexFormat;",
    "import org.bouncycastle.asn1.sec.SECNamedCurves;",
    "import org.bouncycastle.asn1.x9.X9ECParameters;",
];

const SIGNER: &[&str] = &[
    "import org.bouncycastle.asn1.ASN1EncodableVector;",
    "import org.bouncycastle.asn1.ASN1Integer;",
    "import org.bouncycastle.asn1.ASN1Sequence;",
    "import org.bouncycastle.asn1.DERSequence;",
    "import org.bouncycastle.crypto.digests.SHA256Digest;",
    "import org.bouncycastle.crypto.params.ECDomainParameters;",
    "import org.bouncycastle.crypto.params.ECPrivateKeyParameters;",
    "import org.bouncycastle.crypto.params.ECPublicKeyParameters;",
    "import org.bouncycastle.crypto.signers.ECDSASigner;",
    "import org.bouncycastle.crypto.signers.HMacDSAKCalculator;",
];

impl HelperEmitter for JavaHelpers {
    fn target(&self) -> TargetLanguage { TargetLanguage::Java }

    fn builtin(&self, helper: &str) -> Option<HelperSnippet> {
        let snippet = match helper {
            "setNAGURL" => HelperSnippet::new("this.{{f:nagURL}} = {{p:url}};"),
            "getNAGURL" => HelperSnippet::new("return this.{{f:nagURL}};"),
            "setNAGKey" => HelperSnippet::new("this.{{f:nagKey}} = {{p:key}};"),
            "getNAGKey" => HelperSnippet::new("return this.{{f:nagKey}};"),
            "getError" => HelperSnippet::new("return this.{{f:lastError}};"),
            "getFormattedTimestamp" => HelperSnippet::new(
                r#"return ZonedDateTime.now(ZoneOffset.UTC).format(DateTimeFormatter.ofPattern("yyyy:MM:dd-HH:mm:ss"));"#,
            )
            .with_imports(&[
                "import java.time.ZoneOffset;",
                "import java.time.ZonedDateTime;",
                "import java.time.format.DateTimeFormatter;",
            ]),
            "stringToHex" => HelperSnippet::new(
                "return HexFormat.of().formatHex({{p:text}}.getBytes(StandardCharsets.UTF_8));",
            )
            .with_imports(HEX),
            "hexToString" => HelperSnippet::new(
                "return new String(HexFormat.of().parseHex({{m:hexFix}}({{p:hex}})), StandardCharsets.UTF_8);",
            )
            .with_imports(HEX),
            "hexFix" => HelperSnippet::new(
                r#"return {{p:hex}}.startsWith("0x") || {{p:hex}}.startsWith("0X") ? {{p:hex}}.substring(2) : {{p:hex}};"#,
            ),
            "padNumber" => HelperSnippet::new(
                r#"return {{p:num}} < 10 ? "0" + {{p:num}} : String.valueOf({{p:num}});"#,
            ),
            "hashString" => HelperSnippet::new(
                r#"try {
    MessageDigest _digest = MessageDigest.getInstance("SHA-256");
    return HexFormat.of().formatHex(_digest.digest({{p:text}}.getBytes(StandardCharsets.UTF_8)));
} catch (NoSuchAlgorithmException _e) {
    throw new IllegalStateException(_e);
}"#,
            )
            .with_imports(HEX)
            .with_imports(&[
                "import java.security.MessageDigest;",
                "import java.security.NoSuchAlgorithmException;",
            ]),
            "getPublicKey" => HelperSnippet::new(
                r#"X9ECParameters _curve = SECNamedCurves.getByName("secp256k1");
BigInteger _d = new BigInteger(1, HexFormat.of().parseHex({{m:hexFix}}({{p:privateKey}})));
return HexFormat.of().formatHex(_curve.getG().multiply(_d).normalize().getEncoded(false));"#,
            )
            .with_imports(CURVE),
            "signMessage" => HelperSnippet::new(
                r#"X9ECParameters _curve = SECNamedCurves.getByName("secp256k1");
ECDomainParameters _domain = new ECDomainParameters(_curve.getCurve(), _curve.getG(), _curve.getN(), _curve.getH());
BigInteger _d = new BigInteger(1, HexFormat.of().parseHex({{m:hexFix}}({{p:privateKey}})));
byte[] _hash = HexFormat.of().parseHex({{m:hashString}}({{p:message}}));
ECDSASigner _signer = new ECDSASigner(new HMacDSAKCalculator(new SHA256Digest()));
_signer.init(true, new ECPrivateKeyParameters(_d, _domain));
BigInteger[] _rs = _signer.generateSignature(_hash);
BigInteger _s = _rs[1].compareTo(_curve.getN().shiftRight(1)) > 0 ? _curve.getN().subtract(_rs[1]) : _rs[1];
ASN1EncodableVector _seq = new ASN1EncodableVector();
_seq.add(new ASN1Integer(_rs[0]));
_seq.add(new ASN1Integer(_s));
try {
    return HexFormat.of().formatHex(new DERSequence(_seq).getEncoded());
} catch (IOException _e) {
    throw new IllegalStateException(_e);
}"#,
            )
            .with_imports(CURVE)
            .with_imports(SIGNER)
            .with_imports(&["import java.io.IOException;"]),
            "verifySignature" => HelperSnippet::new(
                r#"try {
    X9ECParameters _curve = SECNamedCurves.getByName("secp256k1");
    ECDomainParameters _domain = new ECDomainParameters(_curve.getCurve(), _curve.getG(), _curve.getN(), _curve.getH());
    ECPublicKeyParameters _key = new ECPublicKeyParameters(
        _curve.getCurve().decodePoint(HexFormat.of().parseHex({{m:hexFix}}({{p:publicKey}}))), _domain);
    ASN1Sequence _seq = ASN1Sequence.getInstance(HexFormat.of().parseHex({{m:hexFix}}({{p:signature}})));
    ECDSASigner _verifier = new ECDSASigner();
    _verifier.init(false, _key);
    return _verifier.verifySignature(
        HexFormat.of().parseHex({{m:hashString}}({{p:message}})),
        ASN1Integer.getInstance(_seq.getObjectAt(0)).getValue(),
        ASN1Integer.getInstance(_seq.getObjectAt(1)).getValue());
} catch (RuntimeException _e) {
    return false;
}"#,
            )
            .with_imports(CURVE)
            .with_imports(SIGNER),
            _ => return None,
        };
        Some(snippet)
    }
}
