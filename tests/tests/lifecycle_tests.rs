use ethers::types::{Address, Bytes, H256, I256, U256};
use satchel_lifecycle::{LifecycleCoordinator, LifecycleError};
use satchel_primitives::{PaymasterPayload, RawTransactionRequest};
use satchel_tests::{MockResolver, MockSigner, MockSubmitter, MOCK_OPERATION_HASH};
use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

const ORIGIN: &str = "https://dapp.example";

struct TestContext {
    coordinator: LifecycleCoordinator<MockSigner, MockSubmitter, MockResolver>,
    signer: Arc<MockSigner>,
    submitter: Arc<MockSubmitter>,
    resolver: Arc<MockResolver>,
}

fn setup() -> TestContext {
    let signer = Arc::new(MockSigner::default());
    let submitter = Arc::new(MockSubmitter::default());
    let resolver = Arc::new(MockResolver::default());
    let coordinator =
        LifecycleCoordinator::new(signer.clone(), submitter.clone(), resolver.clone());
    TestContext { coordinator, signer, submitter, resolver }
}

fn sender() -> Address {
    Address::repeat_byte(0x01)
}

fn request() -> RawTransactionRequest {
    RawTransactionRequest::new(Address::repeat_byte(0xab), U256::exp10(18), Bytes::default())
}

fn payload() -> PaymasterPayload {
    PaymasterPayload {
        paymaster: "0xCaaaDebF13BD0173eA21C2AC944AfA97dc461de6".parse().unwrap(),
        merkle_root: H256::repeat_byte(0x07),
        input_nullifiers: [H256::repeat_byte(0x11), H256::repeat_byte(0x22)],
        output_commitments: [H256::repeat_byte(0x33), H256::repeat_byte(0x44)],
        recipient: "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap(),
        ext_amount: I256::from(-1_000_000_000_000_000_000i128),
        proof: "0xabcdef0123456789".parse().unwrap(),
    }
}

#[tokio::test]
async fn send_resolves_the_origin_exactly_once() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    let uo = ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();
    assert_eq!(uo.sender, sender());
    assert!(!uo.is_sponsored());

    let hash = ctx.coordinator.send(sender(), &"token".to_string()).await.unwrap();
    assert_eq!(hash, MOCK_OPERATION_HASH.into());

    assert!(ctx.coordinator.store().is_empty());
    assert_eq!(
        *ctx.resolver.resolutions.lock(),
        vec![(ORIGIN.to_string(), MOCK_OPERATION_HASH.into())]
    );
    assert!(ctx.resolver.rejections.lock().is_empty());

    // the request is gone: a second send must not re-notify the origin
    assert!(matches!(
        ctx.coordinator.send(sender(), &"token".to_string()).await,
        Err(LifecycleError::NoActiveRequest)
    ));
    assert_eq!(ctx.resolver.resolutions.lock().len(), 1);
}

#[tokio::test]
async fn reject_works_without_a_built_operation() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    ctx.coordinator.reject().await.unwrap();

    assert!(ctx.coordinator.store().is_empty());
    assert_eq!(*ctx.resolver.rejections.lock(), vec![(ORIGIN.to_string(), String::new())]);

    assert!(matches!(
        ctx.coordinator.send(sender(), &"token".to_string()).await,
        Err(LifecycleError::NoActiveRequest)
    ));
    assert!(matches!(
        ctx.coordinator.reject().await,
        Err(LifecycleError::NoActiveRequest)
    ));
    assert_eq!(ctx.resolver.rejections.lock().len(), 1);
}

#[tokio::test]
async fn sponsored_operation_reaches_the_network_with_the_payload() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    let unsigned = ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();

    let sponsored = ctx.coordinator.sponsor_user_operation(&payload(), 5).unwrap();
    assert_eq!(
        sponsored.verification_gas_limit,
        unsigned.verification_gas_limit * U256::from(5)
    );
    assert_eq!(sponsored.paymaster(), Some(payload().paymaster));

    ctx.coordinator.send(sender(), &"token".to_string()).await.unwrap();

    let submitted = ctx.submitter.submitted.lock();
    assert_eq!(submitted.len(), 1);
    assert!(submitted[0].is_signed());
    // the broadcast bytes decode back to the sponsorship payload
    assert_eq!(
        PaymasterPayload::decode(&submitted[0].paymaster_and_data),
        Ok(Some(payload()))
    );
}

#[tokio::test]
async fn signing_failure_keeps_the_request_for_a_retry() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();

    ctx.signer.decline.store(true, Ordering::SeqCst);
    assert!(matches!(
        ctx.coordinator.send(sender(), &"token".to_string()).await,
        Err(LifecycleError::SigningFailed { .. })
    ));

    // nothing resolved, nothing cleared
    assert!(!ctx.coordinator.store().is_empty());
    assert!(ctx.resolver.resolutions.lock().is_empty());

    // caller-driven retry succeeds against the same pending request
    ctx.signer.decline.store(false, Ordering::SeqCst);
    ctx.coordinator.send(sender(), &"token".to_string()).await.unwrap();
    assert_eq!(ctx.resolver.resolutions.lock().len(), 1);
}

#[tokio::test]
async fn submission_failure_allows_falling_back_to_rejection() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();

    ctx.submitter.fail.store(true, Ordering::SeqCst);
    assert!(matches!(
        ctx.coordinator.send(sender(), &"token".to_string()).await,
        Err(LifecycleError::SubmissionFailed { .. })
    ));
    assert!(!ctx.coordinator.store().is_empty());

    ctx.coordinator.reject().await.unwrap();
    assert_eq!(ctx.resolver.rejections.lock().len(), 1);
    assert!(ctx.resolver.resolutions.lock().is_empty());
}

#[tokio::test]
async fn a_new_request_supersedes_the_pending_one() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();

    let second = RawTransactionRequest::new(
        Address::repeat_byte(0xcd),
        U256::zero(),
        "0xdeadbeef".parse().unwrap(),
    );
    ctx.coordinator.receive_request("https://other.example", second.clone());

    let (state, _) = ctx.coordinator.store().snapshot();
    assert_eq!(state.origin.as_deref(), Some("https://other.example"));
    assert_eq!(state.request, Some(second));
    // the superseded request's derived operation is unrecoverable
    assert_eq!(state.unsigned_user_operation, None);

    assert!(matches!(
        ctx.coordinator.send(sender(), &"token".to_string()).await,
        Err(LifecycleError::NoActiveRequest)
    ));
    assert!(ctx.resolver.resolutions.lock().is_empty());
}

#[tokio::test]
async fn reject_racing_an_inflight_send_notifies_only_once() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();

    *ctx.signer.delay.lock() = Some(Duration::from_millis(100));

    let coordinator = Arc::new(ctx.coordinator);
    let inflight = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.send(sender(), &"token".to_string()).await })
    };

    // let the send pass its snapshot and park inside the signer
    tokio::time::sleep(Duration::from_millis(20)).await;
    coordinator.reject().await.unwrap();

    // the in-flight send still completes with the hash it submitted, but the
    // already-rejected origin is not notified a second time
    let hash = inflight.await.unwrap().unwrap();
    assert_eq!(hash, MOCK_OPERATION_HASH.into());
    assert_eq!(*ctx.resolver.rejections.lock(), vec![(ORIGIN.to_string(), String::new())]);
    assert!(ctx.resolver.resolutions.lock().is_empty());
    assert!(coordinator.store().is_empty());
}

#[tokio::test]
async fn signing_context_is_forwarded_opaquely() {
    let ctx = setup();

    ctx.coordinator.receive_request(ORIGIN, request());
    ctx.coordinator.create_unsigned_user_operation(sender()).await.unwrap();
    ctx.coordinator.send(sender(), &"session-token-1".to_string()).await.unwrap();

    assert_eq!(*ctx.signer.contexts.lock(), vec!["session-token-1".to_string()]);
}

#[tokio::test]
async fn batched_requests_are_stored_for_confirmation() {
    let ctx = setup();

    ctx.coordinator.receive_requests(ORIGIN, vec![request(), request()]);
    ctx.coordinator.record_modified_requests(vec![request()]).unwrap();

    let (state, _) = ctx.coordinator.store().snapshot();
    assert_eq!(state.requests.map(|r| r.len()), Some(2));
    assert_eq!(state.modified_requests.map(|r| r.len()), Some(1));
    // the original batch stays untouched next to the edited copy

    // a batch alone has no single request to derive an operation from
    assert!(matches!(
        ctx.coordinator.create_unsigned_user_operation(sender()).await,
        Err(LifecycleError::NoActiveRequest)
    ));
}
