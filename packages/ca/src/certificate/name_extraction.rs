//! Subject attribute extraction
//!
//! Attribute values are accepted in the four directory string encodings
//! seen in practice; anything else (BMPString, UniversalString) is skipped.

use const_oid::ObjectIdentifier;
use der::asn1::{Ia5StringRef, PrintableStringRef, TeletexStringRef, Utf8StringRef};
use der::Any;
use x509_cert::name::Name;

const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const OID_C: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const OID_L: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const OID_ST: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const OID_O: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const OID_OU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// Subject attributes in certificate order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubjectFields {
    /// Last `CN` seen
    pub common_name: Option<String>,
    /// `O` values
    pub organization: Vec<String>,
    /// `OU` values
    pub organization_unit: Vec<String>,
    /// `C` values
    pub country: Vec<String>,
    /// `ST` values
    pub province: Vec<String>,
    /// `L` values
    pub locality: Vec<String>,
}

/// Collect the subject attributes the catalog cares about
///
/// Walks every RDN, including multi-valued ones, so `O=A+O=B` and
/// `O=A, O=B` both yield two organization values.
pub fn extract_subject(name: &Name) -> SubjectFields {
    let mut fields = SubjectFields::default();

    for rdn in &name.0 {
        for atv in rdn.0.iter() {
            let Some(value) = directory_string(&atv.value) else {
                tracing::debug!("Skipping subject attribute {} with unsupported encoding", atv.oid);
                continue;
            };

            match atv.oid {
                OID_CN => fields.common_name = Some(value),
                OID_O => fields.organization.push(value),
                OID_OU => fields.organization_unit.push(value),
                OID_C => fields.country.push(value),
                OID_ST => fields.province.push(value),
                OID_L => fields.locality.push(value),
                _ => {}
            }
        }
    }

    fields
}

fn directory_string(value: &Any) -> Option<String> {
    if let Ok(s) = value.decode_as::<PrintableStringRef<'_>>() {
        Some(s.to_string())
    } else if let Ok(s) = value.decode_as::<Utf8StringRef<'_>>() {
        Some(s.to_string())
    } else if let Ok(s) = value.decode_as::<Ia5StringRef<'_>>() {
        Some(s.to_string())
    } else if let Ok(s) = value.decode_as::<TeletexStringRef<'_>>() {
        Some(s.to_string())
    } else {
        None
    }
}
