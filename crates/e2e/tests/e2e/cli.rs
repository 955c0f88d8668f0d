use {
    clap::Parser,
    e2e::{Setup, run_test},
    membership::arguments::Arguments,
    std::process::ExitCode,
};

fn arguments(setup: &Setup, config: &std::path::Path, command: &[&str]) -> Arguments {
    let mut args = vec![
        "polygon-dao".to_owned(),
        "--network".to_owned(),
        "localhost".to_owned(),
        "--config".to_owned(),
        config.display().to_string(),
        "--artifacts".to_owned(),
        setup.artifacts_dir.display().to_string(),
        "--deployments".to_owned(),
        setup.deployments_dir().display().to_string(),
    ];
    args.extend(command.iter().map(|arg| arg.to_string()));
    Arguments::try_parse_from(args).unwrap()
}

#[tokio::test]
#[ignore]
async fn local_node_deploy_then_interact() {
    run_test(deploy_then_interact).await;
}

async fn deploy_then_interact(setup: Setup) {
    let config = setup.config_file();

    membership::run(arguments(&setup, &config, &["deploy"]))
        .await
        .unwrap();
    let chain_id = std::fs::read_to_string(setup.deployments_dir().join("localhost/.chainId"))
        .unwrap();
    assert_eq!(chain_id, network::DEV_CHAIN_ID.to_string());

    let result = membership::run(arguments(&setup, &config, &["interact"])).await;
    assert_eq!(membership::exit_code(&result), ExitCode::SUCCESS);
}

#[tokio::test]
#[ignore]
async fn local_node_interact_requires_deployment() {
    run_test(interact_requires_deployment).await;
}

async fn interact_requires_deployment(setup: Setup) {
    let config = setup.config_file();
    let result = membership::run(arguments(&setup, &config, &["interact"])).await;
    assert!(matches!(
        result,
        Err(membership::Error::Script(membership::Failed {
            stage: membership::Stage::Lookup,
            ..
        }))
    ));
    assert_eq!(membership::exit_code(&result), ExitCode::FAILURE);
}

#[tokio::test]
#[ignore]
async fn ephemeral_network_run() {
    run_test(ephemeral_run).await;
}

async fn ephemeral_run(setup: Setup) {
    let args = Arguments::try_parse_from([
        "polygon-dao".to_owned(),
        "--network".to_owned(),
        "hardhat".to_owned(),
        "--artifacts".to_owned(),
        setup.artifacts_dir.display().to_string(),
        "--deployments".to_owned(),
        setup.deployments_dir().display().to_string(),
        "run".to_owned(),
    ])
    .unwrap();
    membership::run(args).await.unwrap();
    // Nothing is persisted for the ephemeral network.
    assert!(!setup.deployments_dir().join("hardhat").exists());
}
