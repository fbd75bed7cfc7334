mod common;

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{TestServer, config_for, laptop, serve_custom};
use pcbook_rpc::catalog_proto::laptop_service_server::LaptopService;
use pcbook_rpc::catalog_proto::{
    CreateLaptopRequest, CreateLaptopResponse, Filter, SearchLaptopRequest, SearchLaptopResponse,
};
use pcbook_rpc::client::{CREATE_LAPTOP_PATH, SEARCH_LAPTOP_PATH};
use pcbook_rpc::grpc::IdAssigner;
use pcbook_rpc::rpc::{CancelHandle, ErrorKind, GrpcPath, RpcClientConfig, RpcSession};
use pcbook_rpc::rpc::StreamState;
use pcbook_rpc::{CreateOutcome, LaptopClient};
use tonic::{Code, Request, Response, Status};

/// A service that answers slowly, rejects creates on demand and fails searches after a fixed
/// number of results.
#[derive(Default)]
struct FlakyService {
    create_delay: Duration,
    create_failure: Option<Code>,
    creates_completed: Arc<AtomicUsize>,
    search_items_before_failure: usize,
    stall_search: bool,
}

#[tonic::async_trait]
impl LaptopService for FlakyService {
    type SearchLaptopStream =
        Pin<Box<dyn futures::Stream<Item = Result<SearchLaptopResponse, Status>> + Send>>;

    async fn create_laptop(
        &self,
        _request: Request<CreateLaptopRequest>,
    ) -> Result<Response<CreateLaptopResponse>, Status> {
        tokio::time::sleep(self.create_delay).await;
        if let Some(code) = self.create_failure {
            return Err(Status::new(code, "create rejected"));
        }
        self.creates_completed.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(CreateLaptopResponse {
            id: "slow".to_string(),
        }))
    }

    async fn search_laptop(
        &self,
        _request: Request<SearchLaptopRequest>,
    ) -> Result<Response<Self::SearchLaptopStream>, Status> {
        let count = self.search_items_before_failure;
        let stall = self.stall_search;

        let outbound = async_stream::stream! {
            for i in 0..count {
                yield Ok(SearchLaptopResponse {
                    laptop: Some(laptop(&format!("item-{i}"), 1000.0, 4, 3.0, 8)),
                });
            }
            if stall {
                std::future::pending::<()>().await;
            }
            yield Err(Status::internal("store offline"));
        };

        Ok(Response::new(Box::pin(outbound)))
    }
}

async fn session_for(addr: std::net::SocketAddr) -> RpcSession {
    RpcSession::connect(&config_for(addr, Duration::from_secs(5)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_expired_deadline_sends_nothing() {
    let server = TestServer::start(IdAssigner::Uuid).await;
    let config = RpcClientConfig::builder()
        .endpoint(server.addr.to_string())
        .create_timeout(Duration::ZERO)
        .build();
    let client = LaptopClient::connect(&config).await.unwrap();

    let err = client
        .create_laptop(laptop("", 1000.0, 4, 3.0, 8))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert!(err.is_fatal());
    assert!(server.store.is_empty());
}

#[tokio::test]
async fn test_expired_deadline_on_stream_open() {
    let server = TestServer::start(IdAssigner::Uuid).await;
    let session = session_for(server.addr).await;
    let path = GrpcPath::from_static(SEARCH_LAPTOP_PATH);

    let err = session
        .open_stream::<_, SearchLaptopResponse>(
            &path,
            SearchLaptopRequest { filter: None },
            Duration::ZERO,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert!(err.to_string().contains("SearchLaptop"));
}

#[tokio::test]
async fn test_slow_unary_call_times_out() {
    let (addr, _server) = serve_custom(FlakyService {
        create_delay: Duration::from_secs(10),
        ..Default::default()
    })
    .await;
    let client = LaptopClient::connect(&config_for(addr, Duration::from_millis(200)))
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    let err = client
        .create_laptop(laptop("", 1000.0, 4, 3.0, 8))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert!(started.elapsed() < Duration::from_secs(5));
}

async fn create_against_failing_service(code: Code) -> pcbook_rpc::rpc::RpcError {
    let (addr, _server) = serve_custom(FlakyService {
        create_failure: Some(code),
        ..Default::default()
    })
    .await;
    let client = LaptopClient::connect(&config_for(addr, Duration::from_secs(5)))
        .await
        .unwrap();

    client
        .create_laptop(laptop("", 1000.0, 4, 3.0, 8))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_unexpected_status_is_unclassified() {
    let err = create_against_failing_service(Code::InvalidArgument).await;

    assert_eq!(err.kind(), ErrorKind::Unclassified);
    assert!(err.is_fatal());
    assert!(err.to_string().contains("CreateLaptop"));
    assert!(err.to_string().contains("create rejected"));
}

#[tokio::test]
async fn test_remote_deadline_exceeded_is_deadline_error() {
    let err = create_against_failing_service(Code::DeadlineExceeded).await;

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_remote_cancel_before_deadline_is_cancelled() {
    let err = create_against_failing_service(Code::Cancelled).await;

    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn test_stream_deadline_covers_whole_stream() {
    let (addr, _server) = serve_custom(FlakyService {
        search_items_before_failure: 2,
        stall_search: true,
        ..Default::default()
    })
    .await;
    let client = LaptopClient::connect(&config_for(addr, Duration::from_millis(300)))
        .await
        .unwrap();

    let mut stream = client.search_laptop(Filter::default()).await.unwrap();
    assert!(stream.next().await.unwrap().is_some());
    assert!(stream.next().await.unwrap().is_some());

    let err = stream.next().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert_eq!(stream.state(), StreamState::Errored);
    assert!(stream.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_stream_failure_is_terminal() {
    let (addr, _server) = serve_custom(FlakyService {
        search_items_before_failure: 1,
        ..Default::default()
    })
    .await;
    let client = LaptopClient::connect(&config_for(addr, Duration::from_secs(5)))
        .await
        .unwrap();

    let mut stream = client.search_laptop(Filter::default()).await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.laptop.unwrap().id, "item-0");

    let err = stream.next().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StreamTerminated);
    assert!(err.to_string().contains("store offline"));

    assert_eq!(stream.state(), StreamState::Errored);
    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(stream.received(), 1);
}

#[tokio::test]
async fn test_cancel_unblocks_unary_call() {
    let creates_completed = Arc::new(AtomicUsize::new(0));
    let (addr, _server) = serve_custom(FlakyService {
        create_delay: Duration::from_secs(10),
        creates_completed: Arc::clone(&creates_completed),
        ..Default::default()
    })
    .await;

    let cancel = CancelHandle::new();
    let session = session_for(addr).await.with_cancel(cancel.signal());
    let path = GrpcPath::from_static(CREATE_LAPTOP_PATH);

    let call = tokio::spawn(async move {
        session
            .unary::<_, CreateLaptopResponse>(
                &path,
                CreateLaptopRequest { laptop: None },
                Duration::from_secs(30),
            )
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let err = tokio::time::timeout(Duration::from_secs(2), call)
        .await
        .expect("cancellation should unblock the call")
        .unwrap()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(creates_completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_unblocks_stream_next() {
    let (addr, _server) = serve_custom(FlakyService {
        stall_search: true,
        ..Default::default()
    })
    .await;

    let cancel = CancelHandle::new();
    let session = session_for(addr).await.with_cancel(cancel.signal());
    let config = config_for(addr, Duration::from_secs(30));
    let client = LaptopClient::new(session, &config);

    let mut stream = client.search_laptop(Filter::default()).await.unwrap();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        cancel
    });

    let err = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("cancellation should unblock next()")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    // Calls issued after cancellation fail without reaching the server.
    let _cancel = canceller.await.unwrap();
    let err = client.search_laptop(Filter::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = RpcClientConfig::builder()
        .endpoint(addr.to_string())
        .connect_timeout(Duration::from_secs(1))
        .build();
    let err = RpcSession::connect(&config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.operation(), "connect");
}

#[tokio::test]
async fn test_invalid_endpoint_is_rejected() {
    let config = RpcClientConfig::builder()
        .endpoint("http://bad host:80")
        .lazy(true)
        .build();
    let err = RpcSession::connect(&config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("bad host"));
}

#[tokio::test]
async fn test_session_is_shared_across_tasks() {
    let server = TestServer::start(IdAssigner::sequential()).await;
    let client = LaptopClient::connect(&server.config()).await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.create_laptop(laptop("", 1000.0, 4, 3.0, 8)).await })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        match task.await.unwrap().unwrap() {
            CreateOutcome::Created(id) => ids.push(id.to_string()),
            CreateOutcome::AlreadyExists => panic!("concurrent creates must not conflict"),
        }
    }

    ids.sort_by_key(|id| id.parse::<u32>().unwrap());
    let expected: Vec<String> = (1..=8).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_lazy_session_connects_on_first_call() {
    let server = TestServer::start(IdAssigner::Uuid).await;
    let config = RpcClientConfig::builder()
        .endpoint(format!("http://{}", server.addr))
        .lazy(true)
        .build();
    let client = LaptopClient::connect(&config).await.unwrap();
    assert_eq!(client.session().endpoint(), format!("http://{}", server.addr));

    let outcome = client
        .create_laptop(laptop("", 1000.0, 4, 3.0, 8))
        .await
        .unwrap();
    assert!(matches!(outcome, CreateOutcome::Created(_)));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_calls_report_under_injected_span() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = TestServer::start(IdAssigner::Uuid).await;
    let session = session_for(server.addr)
        .await
        .with_span(tracing::info_span!("catalog_probe"));
    let client = LaptopClient::new(session, &server.config());

    client
        .create_laptop(laptop("", 1000.0, 4, 3.0, 8))
        .await
        .unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("catalog_probe"));
    assert!(output.contains("Sending unary request"));
}
