use async_trait::async_trait;
use aws_config::{profile::profile_file::ProfileFiles, BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_types::os_shim_internal::{Env, Fs};
use stacked_errors::{bail, Result, StackableErr};
use tracing::{debug, info};

pub const DEFAULT_PROFILE: &str = "default";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const DEFAULT_PROFILE_VAR: &str = "AWS_DEFAULT_PROFILE";

/// The configuration everything after credential resolution runs against
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Empty if no region could be resolved, which means there is no usable
    /// profile
    pub region: String,
    pub sdk_config: SdkConfig,
}

impl CloudConfig {
    pub fn from_sdk(sdk_config: SdkConfig) -> Self {
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_default();
        Self { region, sdk_config }
    }

    pub fn has_region(&self) -> bool {
        !self.region.is_empty()
    }
}

/// The environment variables that influence profile selection, captured once
/// so that resolution does not depend on the live process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEnv {
    pub session_token: Option<String>,
    pub default_profile: Option<String>,
}

impl ProfileEnv {
    /// Reads `AWS_SESSION_TOKEN` and `AWS_DEFAULT_PROFILE`, empty values are
    /// treated as unset
    pub fn from_process_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [ProfileEnv::from_process_env] with `lookup` in place of the
    /// process environment
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v: &String| !v.is_empty());
        Self {
            session_token: var(SESSION_TOKEN_VAR),
            default_profile: var(DEFAULT_PROFILE_VAR),
        }
    }
}

/// Which profile the loader is asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileChoice {
    /// No profile override, used when a session token is active
    Ambient,
    Named(String),
}

impl ProfileChoice {
    /// An active session token wins over any profile. Otherwise the
    /// `"default"` profile may be redirected by `AWS_DEFAULT_PROFILE`.
    pub fn resolve(requested: &str, env: &ProfileEnv) -> Self {
        if env.session_token.is_some() {
            return Self::Ambient
        }
        if requested == DEFAULT_PROFILE {
            if let Some(ref profile) = env.default_profile {
                return Self::Named(profile.clone())
            }
        }
        Self::Named(requested.to_owned())
    }

    pub fn profile_name(&self) -> Option<&str> {
        match self {
            Self::Ambient => None,
            Self::Named(name) => Some(name),
        }
    }
}

/// Loads the SDK configuration for a profile, or for no particular profile
/// when given `None`
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    async fn load(&self, profile: Option<&str>) -> Result<CloudConfig>;
}

/// Fails if `profile` is in neither the shared config nor the shared
/// credentials file. `aws-config` silently falls back to an empty profile.
pub async fn ensure_profile_exists(fs: &Fs, env: &Env, profile: &str) -> Result<()> {
    let profiles = aws_config::profile::load(fs, env, &ProfileFiles::default(), None)
        .await
        .stack_err("ensure_profile_exists -> failed to read the shared profile files")?;
    if profiles.get_profile(profile).is_none() {
        let known: Vec<&str> = profiles.profiles().collect();
        bail!("ensure_profile_exists -> profile {profile:?} is not defined, found {known:?}")
    }
    Ok(())
}

/// The `aws-config` backed loader
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsConfigLoader;

#[async_trait]
impl ConfigLoader for AwsConfigLoader {
    async fn load(&self, profile: Option<&str>) -> Result<CloudConfig> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            ensure_profile_exists(&Fs::real(), &Env::real(), profile)
                .await
                .stack_err_with(|| format!("AwsConfigLoader::load(profile: {profile:?})"))?;
            loader = loader.profile_name(profile);
        }
        let config = CloudConfig::from_sdk(loader.load().await);
        if !config.has_region() {
            // the caller reports this as a missing profile, credentials are irrelevant
            return Ok(config)
        }
        // `aws-config` is lazy about credentials, resolve them now so that a bad
        // profile fails here instead of at the first ECS call
        let provider = config
            .sdk_config
            .credentials_provider()
            .stack_err("AwsConfigLoader::load -> no credentials provider is configured")?;
        provider
            .provide_credentials()
            .await
            .stack_err_with(|| format!("AwsConfigLoader::load(profile: {profile:?})"))?;
        Ok(config)
    }
}

/// Resolves the profile to use and loads its configuration
#[derive(Debug, Clone)]
pub struct CredentialResolver<L> {
    loader: L,
    env: ProfileEnv,
}

impl<L: ConfigLoader> CredentialResolver<L> {
    pub fn new(loader: L, env: ProfileEnv) -> Self {
        Self { loader, env }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Returns the loaded configuration. A configuration with an empty region
    /// is returned normally, callers must check [CloudConfig::has_region].
    pub async fn resolve(&self, profile: &str) -> Result<CloudConfig> {
        let choice = ProfileChoice::resolve(profile, &self.env);
        debug!("requested profile {profile:?}, resolved to {choice:?}");
        let config = self
            .loader
            .load(choice.profile_name())
            .await
            .stack_err_with(|| format!("CredentialResolver::resolve(profile: {profile:?})"))?;
        if config.has_region() {
            info!("using region {}", config.region);
        }
        Ok(config)
    }
}
