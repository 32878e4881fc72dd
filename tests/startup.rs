use std::io;

use sample_users::server;

#[tokio::test]
async fn fails_to_bind_occupied_port() {
    let taken = server::bind(0).await.expect("failed to bind");
    let port = taken.local_addr().unwrap().port();

    let err = server::bind(port).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
}
