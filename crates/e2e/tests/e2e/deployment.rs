use {
    alloy::{
        primitives::U256,
        providers::{Provider, ext::AnvilApi},
    },
    contracts::polygon_dao::CONTRACT_NAME,
    deployments::{Deployer, DeploymentStore, FileStore, Outcome},
    e2e::{Setup, run_test},
    ethrpc::Chain,
    network::Network,
    std::sync::Arc,
};

#[tokio::test]
#[ignore]
async fn local_node_deploy_and_reuse() {
    run_test(deploy_and_reuse).await;
}

async fn deploy_and_reuse(setup: Setup) {
    let store = Arc::new(FileStore::new(setup.deployments_dir()));
    let deployer = Deployer::new(
        setup.profile.clone(),
        setup.chain.clone(),
        setup.artifacts(),
        store.clone(),
    );
    let account = setup.chain.signers()[0];

    let first = deployer.deploy(CONTRACT_NAME, account, &[]).await.unwrap();
    assert_eq!(first.outcome, Outcome::Deployed);
    assert_eq!(first.record.num_deployments, 1);
    assert_eq!(first.record.chain_id, network::DEV_CHAIN_ID);
    assert!(
        !setup
            .chain
            .provider()
            .get_code_at(first.record.address)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        setup
            .deployments_dir()
            .join("localhost")
            .join(format!("{CONTRACT_NAME}.json"))
            .is_file()
    );

    let second = deployer.deploy(CONTRACT_NAME, account, &[]).await.unwrap();
    assert_eq!(second.outcome, Outcome::Reused);
    assert_eq!(second.record, first.record);

    let stored = store.get(Network::Localhost, CONTRACT_NAME).await.unwrap();
    assert_eq!(stored, Some(first.record));
}

#[tokio::test]
#[ignore]
async fn local_node_unfunded_deployer() {
    run_test(unfunded_deployer).await;
}

async fn unfunded_deployer(setup: Setup) {
    let account = setup.chain.signers()[9];
    setup
        .chain
        .provider()
        .anvil_set_balance(account, U256::ZERO)
        .await
        .unwrap();
    assert!(setup.chain.balance(account).await.unwrap().is_zero());

    let store = Arc::new(FileStore::new(setup.deployments_dir()));
    let deployer = Deployer::new(
        setup.profile.clone(),
        setup.chain.clone(),
        setup.artifacts(),
        store.clone(),
    );
    let result = deployer.deploy(CONTRACT_NAME, account, &[]).await;
    assert!(matches!(
        result,
        Err(deployments::DeploymentError::Unfunded(unfunded)) if unfunded == account
    ));
    assert_eq!(
        store.get(Network::Localhost, CONTRACT_NAME).await.unwrap(),
        None
    );
}
