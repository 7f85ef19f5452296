//! StorH service endpoints.

use url::Url;

use storh_core::GroupId;

use crate::error::FetchError;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://storhapi.skogdev.no/v1/";

/// Login endpoint.
const LOGIN_ENDPOINT: &str = "auth/login";

/// Group listing endpoint.
const GROUPS_ENDPOINT: &str = "group/getgroups";

/// Items-in-group endpoint.
const ITEMS_ENDPOINT: &str = "item/getitemsingroup";

/// URL builder for the StorH API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Creates endpoints rooted at `base`.
    ///
    /// A missing trailing slash is added so relative joins keep the
    /// version segment (`.../v1` + `auth/login` → `.../v1/auth/login`).
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    /// `POST auth/login`.
    pub fn login(&self) -> Result<Url, FetchError> {
        Ok(self.base.join(LOGIN_ENDPOINT)?)
    }

    /// `GET group/getgroups`.
    pub fn groups(&self) -> Result<Url, FetchError> {
        Ok(self.base.join(GROUPS_ENDPOINT)?)
    }

    /// `GET item/getitemsingroup?groupId=<id>&isShoppingList=true`.
    pub fn shopping_list(&self, group: &GroupId) -> Result<Url, FetchError> {
        let mut url = self.base.join(ITEMS_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("groupId", group.as_str())
            .append_pair("isShoppingList", "true");
        Ok(url)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|e| {
                panic!("Built-in base URL {DEFAULT_BASE_URL} is invalid: {e}")
            }),
        }
    }
}
