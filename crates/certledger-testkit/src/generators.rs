//! Proptest generators for property-based testing.

use proptest::prelude::*;

use certledger_core::CertificateFields;

/// Printable ASCII name without surrounding whitespace.
pub fn ascii_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]([A-Za-z0-9 .,&()'-]{0,30}[A-Za-z0-9])?".prop_map(String::from)
}

/// Words separated by runs of one to three spaces.
pub fn spaced_name() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,8}( {1,3}[A-Za-z]{1,8}){1,3}".prop_map(String::from)
}

/// A single alphanumeric character.
pub fn single_char() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]".prop_map(String::from)
}

/// Latin-1 letters, including accented ones.
pub fn latin1_name() -> impl Strategy<Value = String> {
    "[A-Za-zÀ-ÖØ-öø-ÿ]{1,12}( [A-Za-zÀ-ÖØ-öø-ÿ]{1,12})?".prop_map(String::from)
}

/// A registration-style identifier.
pub fn identifier() -> impl Strategy<Value = String> {
    "[A-Z]{1,3}-?[0-9]{1,8}".prop_map(String::from)
}

/// Any of the name shapes that must survive a document round trip.
pub fn field_value() -> impl Strategy<Value = String> {
    prop_oneof![ascii_name(), spaced_name(), single_char(), latin1_name()]
}

/// Arbitrary valid certificate fields.
pub fn certificate_fields() -> impl Strategy<Value = CertificateFields> {
    (field_value(), field_value(), field_value(), identifier())
        .prop_map(|(org, candidate, course, id)| CertificateFields::new(org, candidate, course, id))
}

/// Leading or trailing whitespace to pad a field with.
pub fn padding() -> impl Strategy<Value = String> {
    "[ \t\n]{0,3}".prop_map(String::from)
}

/// Fields with every value wrapped in random surrounding whitespace.
pub fn padded_fields() -> impl Strategy<Value = (CertificateFields, CertificateFields)> {
    (certificate_fields(), prop::collection::vec(padding(), 8)).prop_map(|(fields, pads)| {
        let pad = |i: usize, s: &str| format!("{}{}{}", pads[2 * i], s, pads[2 * i + 1]);
        let padded = CertificateFields::new(
            pad(0, &fields.organization),
            pad(1, &fields.candidate),
            pad(2, &fields.course),
            pad(3, &fields.identifier),
        );
        (fields, padded)
    })
}

/// Every single-character substitution of `fields`, up to `limit`.
///
/// Each printable ASCII character is replaced by its neighbour (`~` wraps to
/// `!`), one position at a time, across all four fields. Deterministic, so
/// avalanche tests cover the same mutations on every run.
pub fn single_char_mutations(fields: &CertificateFields, limit: usize) -> Vec<CertificateFields> {
    let mut out = Vec::new();
    let values = [
        &fields.organization,
        &fields.candidate,
        &fields.course,
        &fields.identifier,
    ];

    for (field_idx, value) in values.iter().enumerate() {
        let chars: Vec<char> = value.chars().collect();
        for pos in 0..chars.len() {
            let replacement = match chars[pos] {
                '~' => '!',
                c if c.is_ascii_graphic() => (c as u8 + 1) as char,
                ' ' => '_',
                _ => continue,
            };
            let mut mutated = chars.clone();
            mutated[pos] = replacement;
            let mutated: String = mutated.into_iter().collect();

            let mut next = fields.clone();
            match field_idx {
                0 => next.organization = mutated,
                1 => next.candidate = mutated,
                2 => next.course = mutated,
                _ => next.identifier = mutated,
            }
            out.push(next);

            if out.len() == limit {
                return out;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use certledger_core::{validate_fields, Fingerprint};

    proptest! {
        #[test]
        fn test_generated_fields_are_valid(fields in certificate_fields()) {
            prop_assert!(validate_fields(&fields).is_ok());
        }

        #[test]
        fn test_fingerprint_deterministic(fields in certificate_fields()) {
            prop_assert_eq!(Fingerprint::of(&fields), Fingerprint::of(&fields.clone()));
        }

        #[test]
        fn test_padding_does_not_change_fingerprint((fields, padded) in padded_fields()) {
            prop_assert_eq!(Fingerprint::of(&fields), Fingerprint::of(&padded));
        }

        #[test]
        fn test_distinct_fields_distinct_fingerprints(
            a in certificate_fields(),
            b in certificate_fields(),
        ) {
            prop_assume!(a.normalized() != b.normalized());
            prop_assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
        }
    }

    #[test]
    fn test_single_char_mutations() {
        let fields = CertificateFields::new("ab", "c", "d ~", "1");
        let mutations = single_char_mutations(&fields, 100);
        // a, b, c, d, space, ~, 1
        assert_eq!(mutations.len(), 7);
        assert_eq!(mutations[0].organization, "bb");
        assert_eq!(mutations[4].course, "d_~");
        assert_eq!(mutations[5].course, "d !");
        assert!(mutations.iter().all(|m| m != &fields));

        assert_eq!(single_char_mutations(&fields, 3).len(), 3);
    }
}
