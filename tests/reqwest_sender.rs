//! Transport tests for `ReqwestSender` against a local mock server.

use courier::{
    Connector, Courier, DataType, Method, PendingRequest, PluginRegistry, Request,
    RequestProperties, ReqwestSender, Sender, build_pending_request,
};
use serde_json::json;

struct ApiConnector {
    base_url: String,
}

impl Connector for ApiConnector {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn request_properties(&self) -> RequestProperties {
        RequestProperties::new().header("x-client", "courier-test")
    }
}

struct CreateUser;

impl Request for CreateUser {
    fn method(&self) -> Method {
        Method::POST
    }

    fn endpoint(&self) -> String {
        "/users".into()
    }

    fn request_properties(&self) -> RequestProperties {
        RequestProperties::new().data("name", json!("ada"))
    }

    fn body_capabilities(&self) -> &[DataType] {
        &[DataType::Json]
    }
}

struct ListUsers;

impl Request for ListUsers {
    fn method(&self) -> Method {
        Method::GET
    }

    fn endpoint(&self) -> String {
        "/users".into()
    }

    fn request_properties(&self) -> RequestProperties {
        RequestProperties::new().query_param("page", "2")
    }
}

fn build(base_url: &str, request: &dyn Request) -> PendingRequest {
    let connector = ApiConnector {
        base_url: base_url.to_string(),
    };
    build_pending_request(&PluginRegistry::new(), &connector, request).unwrap()
}

#[tokio::test]
async fn json_post_sends_merged_headers_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/users")
        .match_header("x-client", "courier-test")
        .match_body(mockito::Matcher::Json(json!({"name": "ada"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body("{\"id\":7}")
        .create_async()
        .await;

    let pending = build(&server.url(), &CreateUser);
    let response = ReqwestSender::new().dispatch(&pending).await.unwrap();

    assert_eq!(response.status(), 201);
    assert!(response.transport_error().is_none());
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["id"], 7);
}

#[tokio::test]
async fn query_parameters_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/users")
        .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let pending = build(&server.url(), &ListUsers);
    let response = ReqwestSender::new().dispatch(&pending).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn http_error_status_yields_response_not_error() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/users")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let pending = build(&server.url(), &ListUsers);
    let response = ReqwestSender::new().dispatch(&pending).await.unwrap();

    assert_eq!(response.status(), 503);
    assert!(!response.is_success());
    assert_eq!(response.transport_error().unwrap(), "503 Service Unavailable");
    assert_eq!(response.text(), "unavailable");
}

struct UploadXml;

impl Request for UploadXml {
    fn method(&self) -> Method {
        Method::POST
    }

    fn endpoint(&self) -> String {
        "/import".into()
    }

    fn request_properties(&self) -> RequestProperties {
        RequestProperties::new().raw_body(b"<user><name>ada</name></user>".to_vec())
    }

    fn body_capabilities(&self) -> &[DataType] {
        &[DataType::Xml]
    }
}

#[tokio::test]
async fn xml_body_gets_default_content_type() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/import")
        .match_header("content-type", "application/xml")
        .match_body("<user><name>ada</name></user>")
        .with_status(202)
        .create_async()
        .await;

    let pending = build(&server.url(), &UploadXml);
    let response = ReqwestSender::new().dispatch(&pending).await.unwrap();
    assert_eq!(response.status(), 202);
}

#[tokio::test]
async fn courier_send_runs_full_cycle() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/users")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body("{\"id\":1}")
        .create_async()
        .await;

    let connector = ApiConnector {
        base_url: server.url(),
    };
    let courier = Courier::new();
    let response = courier.send(&connector, &CreateUser).await.unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.request().method, Method::POST);
    assert!(response.request().url.ends_with("/users"));
}
