use {
    contracts::polygon_dao::CONTRACT_NAME,
    deployments::{Deployer, FileStore},
    e2e::{Setup, run_test},
    ethrpc::Chain,
    membership::{Scenario, Stage},
    std::sync::Arc,
};

#[tokio::test]
#[ignore]
async fn local_node_membership_scenario() {
    run_test(membership_scenario).await;
}

async fn membership_scenario(setup: Setup) {
    let store = Arc::new(FileStore::new(setup.deployments_dir()));
    let deployment = Deployer::new(
        setup.profile.clone(),
        setup.chain.clone(),
        setup.artifacts(),
        store.clone(),
    )
    .deploy(CONTRACT_NAME, setup.chain.signers()[0], &[])
    .await
    .unwrap();

    let report = Scenario::new(&setup.profile, store.as_ref(), setup.chain.clone(), 1)
        .run()
        .await
        .unwrap();
    assert_eq!(report.dao, deployment.record.address);
    assert_eq!(report.admin, setup.chain.signers()[0]);
    assert_eq!(report.member, setup.chain.signers()[1]);
}

#[tokio::test]
#[ignore]
async fn local_node_scenario_without_deployment() {
    run_test(scenario_without_deployment).await;
}

async fn scenario_without_deployment(setup: Setup) {
    let store = FileStore::new(setup.deployments_dir());
    let err = Scenario::new(&setup.profile, &store, setup.chain.clone(), 1)
        .run()
        .await
        .unwrap_err();
    assert_eq!(err.stage, Stage::Lookup);
}
