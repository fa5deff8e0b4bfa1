#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use axum_test::TestServer;
use httpmock::MockServer;
// self
use github_oauth_relay::{
	provider::ProviderDescriptor,
	relay::{CallbackRelay, RelayConfig},
	server,
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const FRONTEND: &str = "http://localhost:5173/";

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Fixture URL should parse successfully.")
}

pub fn provider_descriptor(mock: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::builder()
		.authorization_endpoint(url(&mock.url("/authorize")))
		.token_endpoint(url(&mock.url("/token")))
		.user_endpoint(url(&mock.url("/user")))
		.user_emails_endpoint(url(&mock.url("/user/emails")))
		.build()
		.expect("Mock provider descriptor should build successfully.")
}

pub fn build_relay(mock: &MockServer) -> Arc<CallbackRelay> {
	let config = RelayConfig {
		descriptor: provider_descriptor(mock),
		client_id: CLIENT_ID.into(),
		client_secret: CLIENT_SECRET.into(),
		frontend: url(FRONTEND),
	};

	Arc::new(CallbackRelay::new(config).expect("Relay should build from the mock descriptor."))
}

pub fn test_server(mock: &MockServer) -> TestServer {
	TestServer::new(server::router(build_relay(mock)))
		.expect("Test server should start from the relay router.")
}

pub const TOKEN_SUCCESS_BODY: &str =
	"{\"access_token\":\"gho_test\",\"token_type\":\"bearer\",\"scope\":\"read:user,user:email\"}";

pub fn user_body(email: Option<&str>) -> String {
	let email = match email {
		Some(value) => format!("\"{value}\""),
		None => "null".into(),
	};

	format!(
		"{{\"id\":1,\"login\":\"alice\",\"name\":\"Alice Liddell\",\"email\":{email},\
		\"avatar_url\":\"https://avatars.example.com/u/1\",\
		\"html_url\":\"https://github.com/alice\",\"bio\":null,\"public_repos\":3,\
		\"followers\":10,\"following\":2,\"created_at\":\"2020-05-01T12:00:00Z\",\
		\"site_admin\":false}}",
	)
}

pub const PRIMARY_EMAILS_BODY: &str = "[{\"email\":\"ci@example.com\",\"primary\":false,\
	\"verified\":true},{\"email\":\"a@x.com\",\"primary\":true,\"verified\":true}]";
