//! Golden test vectors for deterministic verification.
//!
//! Canonical bytes and fingerprints for fixed field sets. Any change to the
//! canonical encoding shows up here first; a document issued before the
//! change would no longer verify.

use certledger_core::{canonicalize, CertificateFields, Fingerprint};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Organization, candidate, course, identifier.
    pub fields: [&'static str; 4],
    /// Expected canonical encoding (hex).
    pub canonical_hex: &'static str,
    /// Expected fingerprint (hex).
    pub fingerprint_hex: &'static str,
}

impl GoldenVector {
    pub fn certificate_fields(&self) -> CertificateFields {
        let [org, candidate, course, id] = self.fields;
        CertificateFields::new(org, candidate, course, id)
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Acme reference certificate",
            fields: ["Acme University", "Jane Doe", "Distributed Systems", "U1234"],
            canonical_hex: "636572746c65646765722f6669656c64732f7631846f41636d6520556e6976657273697479684a616e6520446f657344697374726962757465642053797374656d73655531323334",
            fingerprint_hex: "374df02a4aeb27fa3bf3ba1a58ccbfe5b41c28ba2057f8cc353661a57f277f86",
        },
        GoldenVector {
            name: "Single-character fields",
            fields: ["A", "B", "C", "D"],
            canonical_hex: "636572746c65646765722f6669656c64732f7631846141614261436144",
            fingerprint_hex: "0e1e35ab584a9ecba643d77c187bf2d07049447520a30b025148476b7a1595f3",
        },
        GoldenVector {
            name: "Latin-1 letters and inner double space",
            fields: ["Ünïversität", "José  Ñúñez", "Rust", "ID-7"],
            canonical_hex: "636572746c65646765722f6669656c64732f7631846ec39c6ec3af766572736974c3a4746f4a6f73c3a92020c391c3bac3b1657a64527573746449442d37",
            fingerprint_hex: "97eb1aac8ad6809e66d16807b0d39f39c42df14c1c7d31e02149cca1d2c89e7a",
        },
    ]
}

/// Check every vector, returning `(name, passed, detail)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .into_iter()
        .map(|vector| {
            let fields = vector.certificate_fields();
            let canonical = hex::encode(canonicalize(&fields));
            let fingerprint = Fingerprint::of(&fields).to_hex();

            let (passed, detail) = if canonical != vector.canonical_hex {
                (false, format!("canonical mismatch: {canonical}"))
            } else if fingerprint != vector.fingerprint_hex {
                (false, format!("fingerprint mismatch: {fingerprint}"))
            } else {
                (true, fingerprint)
            };
            (vector.name.to_string(), passed, detail)
        })
        .collect()
}
