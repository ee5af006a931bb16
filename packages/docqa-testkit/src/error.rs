pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	ParseConfig(#[from] toml::de::Error),

	#[error(transparent)]
	Config(#[from] docqa_config::Error),
}
