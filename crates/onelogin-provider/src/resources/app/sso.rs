//! Read-only `sso` block of apps.

use onelogin_core::Setting;
use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub name: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset", deserialize_with = "wire::int32")]
    pub id: Setting<i32>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub value: Setting<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sso {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub client_id: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub client_secret: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub metadata_url: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub acs_url: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub sls_url: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub issuer: Setting<String>,
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub certificate: Setting<Certificate>,
}

/// Which form of the block to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsoForm {
    Oidc,
    Saml,
}

impl Sso {
    /// Form implied by the fields the API returned
    pub fn detect(&self) -> Option<SsoForm> {
        if self.client_id.is_set() {
            Some(SsoForm::Oidc)
        } else if self.metadata_url.is_set()
            || self.acs_url.is_set()
            || self.issuer.is_set()
            || self.certificate.is_set()
        {
            Some(SsoForm::Saml)
        } else {
            None
        }
    }

    pub fn flatten(&self, form: SsoForm) -> Record {
        let mut out = Record::new();
        match form {
            SsoForm::Oidc => {
                out.set("client_id", &self.client_id);
                out.set("client_secret", &self.client_secret);
            }
            SsoForm::Saml => {
                out.set("metadata_url", &self.metadata_url);
                out.set("acs_url", &self.acs_url);
                out.set("sls_url", &self.sls_url);
                out.set("issuer", &self.issuer);
                if let Setting::Set(cert) = &self.certificate {
                    let mut block = Record::new();
                    block.set("name", &cert.name);
                    block.set("id", &cert.id);
                    block.set("value", &cert.value);
                    out.insert_blocks("certificate", vec![block]);
                }
            }
        }
        out
    }
}

pub fn schema() -> Schema {
    let certificate = Schema::new([
        Attribute::string("name").computed(),
        Attribute::int("id").computed(),
        Attribute::string("value").computed(),
    ]);
    Schema::new([
        Attribute::string("client_id").computed(),
        Attribute::string("client_secret").computed().sensitive(),
        Attribute::string("metadata_url").computed(),
        Attribute::string("acs_url").computed(),
        Attribute::string("sls_url").computed(),
        Attribute::string("issuer").computed(),
        Attribute::new(
            "certificate",
            AttributeType::Block {
                schema: certificate,
                max_items: Some(1),
            },
        )
        .computed(),
    ])
}
