//! Value types carried across the boundary as container elements,
//! properties and callback arguments.

use crate::dict::StringDict;
use crate::error::{InteropError, Result};
use crate::list::ValueList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl TryFrom<$repr> for $name {
            type Error = InteropError;

            fn try_from(raw: $repr) -> Result<Self> {
                match raw {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(InteropError::Argument(format!(
                        concat!("{} is not a valid ", stringify!($name)),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(v: $name) -> $repr {
                v as $repr
            }
        }
    };
}

int_enum! {
    /// Role of a user within a space.
    pub enum SpaceUserRole: i32 {
        Owner = 0,
        Moderator = 1,
        User = 2,
        Invalid = 3,
    }
}

impl Default for SpaceUserRole {
    fn default() -> Self {
        Self::Owner
    }
}

int_enum! {
    /// Severity of a message passed to the log callback.
    pub enum LogLevel: i32 {
        NoLogging = 0,
        Fatal = 1,
        Error = 2,
        Warning = 3,
        Display = 4,
        Log = 5,
        Verbose = 6,
        VeryVerbose = 7,
        All = 8,
    }
}

impl LogLevel {
    /// Matching level on the `log` facade, or `None` for `NoLogging`.
    pub fn to_log_level(self) -> Option<log::Level> {
        match self {
            LogLevel::NoLogging => None,
            LogLevel::Fatal | LogLevel::Error => Some(log::Level::Error),
            LogLevel::Warning => Some(log::Level::Warn),
            LogLevel::Display | LogLevel::Log => Some(log::Level::Info),
            LogLevel::Verbose => Some(log::Level::Debug),
            LogLevel::VeryVerbose | LogLevel::All => Some(log::Level::Trace),
        }
    }
}

int_enum! {
    /// HTTP-style response codes reported by native services.
    pub enum ResponseCode: u16 {
        ResponseInit = 0,
        ResponseContinue = 100,
        ResponseSwitchingProtocols = 101,
        ResponseOK = 200,
        ResponseCreated = 201,
        ResponseAccepted = 202,
        ResponseNoContent = 204,
        ResponseMovedPermanently = 301,
        ResponseFound = 302,
        ResponseNotModified = 304,
        ResponseBadRequest = 400,
        ResponseUnauthorized = 401,
        ResponseForbidden = 403,
        ResponseNotFound = 404,
        ResponseRequestTimeout = 408,
        ResponseConflict = 409,
        ResponseGone = 410,
        ResponseTooManyRequests = 429,
        ResponseInternalServerError = 500,
        ResponseNotImplemented = 501,
        ResponseBadGateway = 502,
        ResponseServiceUnavailable = 503,
        ResponseGatewayTimeout = 504,
    }
}

int_enum! {
    pub enum ELoginState: i32 {
        LoginThirdPartyProviderDetailsRequested = 0,
        LoginRequested = 1,
        LoggedIn = 2,
        LogoutRequested = 3,
        LoggedOut = 4,
        Error = 5,
    }
}

impl Default for ELoginState {
    fn default() -> Self {
        Self::LoggedOut
    }
}

int_enum! {
    /// Feature flag identifiers. Only the sentinel is fixed here, the rest
    /// are assigned by the services that publish flags.
    pub enum EFeatureFlag: i32 {
        Invalid = 0,
    }
}

impl Default for EFeatureFlag {
    fn default() -> Self {
        Self::Invalid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub flag: EFeatureFlag,
    pub enabled: bool,
}

impl FeatureFlag {
    pub fn new(flag: EFeatureFlag, enabled: bool) -> Self {
        Self { flag, enabled }
    }
}

/// Per-application settings record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub application_name: String,
    pub context: String,
    pub allow_anonymous: bool,
    pub settings: StringDict,
}

impl ApplicationSettings {
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    pub fn not_equals(&self, other: &Self) -> bool {
        self != other
    }
}

// Zero is hashed as +0.0 so that `0.0 == -0.0` keeps equal hashes.
fn hash_component<H: Hasher>(v: f32, state: &mut H) {
    let bits = if v == 0.0 { 0u32 } else { v.to_bits() };
    bits.hash(state);
}

macro_rules! vector {
    ($name:ident { $($field:ident),+ }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: f32),+
        }

        impl $name {
            pub fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                $(hash_component(self.$field, state);)+
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let parts = [$(self.$field.to_string()),+];
                write!(f, "{}({})", stringify!($name), parts.join(", "))
            }
        }
    };
}

vector!(Vector2 { x, y });
vector!(Vector3 { x, y, z });
vector!(Vector4 { x, y, z, w });

/// Address and version of a backing service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceDefinition {
    uri: String,
    version: i32,
}

impl ServiceDefinition {
    pub fn new(uri: impl Into<String>, version: i32) -> Self {
        Self {
            uri: uri.into(),
            version,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

/// Service endpoints. Reads copy out, writes copy in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointUris {
    user_service: ServiceDefinition,
    multiplayer_service: ServiceDefinition,
    tracking_service: ServiceDefinition,
}

impl EndpointUris {
    pub fn user_service(&self) -> ServiceDefinition {
        self.user_service.clone()
    }

    pub fn set_user_service(&mut self, def: &ServiceDefinition) {
        self.user_service = def.clone();
    }

    pub fn multiplayer_service(&self) -> ServiceDefinition {
        self.multiplayer_service.clone()
    }

    pub fn set_multiplayer_service(&mut self, def: &ServiceDefinition) {
        self.multiplayer_service = def.clone();
    }

    pub fn tracking_service(&self) -> ServiceDefinition {
        self.tracking_service.clone()
    }

    pub fn set_tracking_service(&mut self, def: &ServiceDefinition) {
        self.tracking_service = def.clone();
    }
}

/// Login state with a growable-list property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginState {
    pub state: ELoginState,
    pub user_id: String,
    pub device_id: String,
    default_application_settings: ValueList<ApplicationSettings>,
}

impl LoginState {
    pub fn default_application_settings(&self) -> &ValueList<ApplicationSettings> {
        &self.default_application_settings
    }

    pub fn default_application_settings_mut(&mut self) -> &mut ValueList<ApplicationSettings> {
        &mut self.default_application_settings
    }

    /// Replace the list with a copy of `list`. An absent list is rejected
    /// rather than leaving the property unset.
    pub fn set_default_application_settings(
        &mut self,
        list: Option<&ValueList<ApplicationSettings>>,
    ) -> Result<()> {
        let list = list.ok_or(InteropError::NullInput("default_application_settings"))?;
        self.default_application_settings = list.clone();
        Ok(())
    }
}
