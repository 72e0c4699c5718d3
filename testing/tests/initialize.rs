use offsig::{
    group_record_address, GroupKey, GroupRecordInitializedEvent, OffsigError, SignatureScheme,
};
use offsig_testing::{
    client::{fetch_group_record, FetchError},
    events::decode_events,
    helpers::{assert_offsig_error, generate_and_fund_key, offsig_error_code, submit_transaction},
    instructions::initialize_instruction,
    precompile::Secp256k1Signer,
    setup::{setup, SetupError},
};
use solana_sdk::{
    instruction::InstructionError, signature::Keypair, signer::Signer,
    transaction::TransactionError,
};

#[test]
fn test_initialize_stores_group_key() {
    let mut env = setup(None).unwrap();
    let group_signer = Keypair::new();
    let group_key = group_signer.pubkey().to_bytes();

    let record_address = env
        .initialize_record(SignatureScheme::Ed25519, &group_key)
        .unwrap();

    let record = fetch_group_record(&env.svm, &record_address).unwrap();
    assert_eq!(record.authority, env.authority.pubkey());
    assert_eq!(record.group_key, GroupKey::Ed25519(group_key));
    assert_eq!(record.group_key.as_bytes(), &group_key);
    assert!(!record.verified);
    assert_eq!(record.verification_count, 0);
    assert_eq!(record.bump, group_record_address(&env.authority.pubkey()).1);
}

#[test]
fn test_initialize_secp256k1_accepts_sec1_key() {
    let mut env = setup(None).unwrap();
    let signer = Secp256k1Signer::random();

    let record_address = env
        .initialize_record(SignatureScheme::Secp256k1, &signer.sec1_public_key())
        .unwrap();

    let record = fetch_group_record(&env.svm, &record_address).unwrap();
    assert_eq!(record.group_key, GroupKey::Secp256k1(signer.group_key()));
    assert_eq!(record.scheme(), SignatureScheme::Secp256k1);
}

#[test]
fn test_initialize_twice_fails_and_keeps_record() {
    let mut env = setup(None).unwrap();
    let first_key = Keypair::new().pubkey().to_bytes();
    let record_address = env
        .initialize_record(SignatureScheme::Ed25519, &first_key)
        .unwrap();

    let second_key = Keypair::new().pubkey().to_bytes();
    let ix = initialize_instruction(&env.authority.pubkey(), SignatureScheme::Ed25519, &second_key);
    let result = submit_transaction(&mut env.svm, &[ix], &env.payer, &[&env.payer, &env.authority]);
    assert_offsig_error(&result, 0, OffsigError::AlreadyInitialized);

    let record = fetch_group_record(&env.svm, &record_address).unwrap();
    assert_eq!(record.group_key, GroupKey::Ed25519(first_key));
}

#[test]
fn test_initialize_rejects_wrong_key_length() {
    let mut env = setup(None).unwrap();
    let authority = env.authority.pubkey();

    let cases: [(SignatureScheme, Vec<u8>); 3] = [
        (SignatureScheme::Ed25519, vec![7u8; 31]),
        (SignatureScheme::Ed25519, vec![7u8; 64]),
        (SignatureScheme::Secp256k1, vec![7u8; 32]),
    ];
    for (scheme, key) in cases {
        let ix = initialize_instruction(&authority, scheme, &key);
        let result =
            submit_transaction(&mut env.svm, &[ix], &env.payer, &[&env.payer, &env.authority]);
        assert_offsig_error(&result, 0, OffsigError::InvalidKeyLength);
    }

    let (record_address, _) = group_record_address(&authority);
    assert!(matches!(
        fetch_group_record(&env.svm, &record_address),
        Err(FetchError::NotFound(address)) if address == record_address
    ));
}

#[test]
fn test_records_are_per_authority() {
    let mut env = setup(None).unwrap();
    let other_authority = generate_and_fund_key(&mut env.svm);

    let first_key = Keypair::new().pubkey().to_bytes();
    let first = env
        .initialize_record(SignatureScheme::Ed25519, &first_key)
        .unwrap();

    let second_key = Keypair::new().pubkey().to_bytes();
    let ix = initialize_instruction(&other_authority.pubkey(), SignatureScheme::Ed25519, &second_key);
    submit_transaction(&mut env.svm, &[ix], &env.payer, &[&env.payer, &other_authority]).unwrap();
    let (second, _) = group_record_address(&other_authority.pubkey());

    assert_ne!(first, second);
    assert_eq!(
        fetch_group_record(&env.svm, &first).unwrap().group_key,
        GroupKey::Ed25519(first_key)
    );
    assert_eq!(
        fetch_group_record(&env.svm, &second).unwrap().authority,
        other_authority.pubkey()
    );
}

#[test]
fn test_fetch_rejects_foreign_accounts() {
    let env = setup(None).unwrap();

    let missing = group_record_address(&env.authority.pubkey()).0;
    assert!(matches!(
        fetch_group_record(&env.svm, &missing),
        Err(FetchError::NotFound(_))
    ));

    // Funded wallets are owned by the system program.
    assert!(matches!(
        fetch_group_record(&env.svm, &env.payer.pubkey()),
        Err(FetchError::WrongOwner { .. })
    ));
}

#[test]
fn test_initialize_emits_event() {
    let mut env = setup(None).unwrap();
    let authority = env.authority.pubkey();
    let signer = Secp256k1Signer::random();

    let ix = initialize_instruction(&authority, SignatureScheme::Secp256k1, &signer.group_key());
    let meta =
        submit_transaction(&mut env.svm, &[ix], &env.payer, &[&env.payer, &env.authority]).unwrap();

    let events = decode_events::<GroupRecordInitializedEvent>(&meta.logs);
    assert_eq!(events.len(), 1, "logs: {:#?}", meta.logs);
    assert_eq!(events[0].record, group_record_address(&authority).0);
    assert_eq!(events[0].authority, authority);
    assert_eq!(events[0].scheme, SignatureScheme::Secp256k1);
}

#[test]
fn test_setup_reports_initialize_transaction_error() {
    let mut env = setup(None).unwrap();
    let group_key = Keypair::new().pubkey().to_bytes();
    env.initialize_record(SignatureScheme::Ed25519, &group_key)
        .unwrap();

    let err = env
        .initialize_record(SignatureScheme::Ed25519, &group_key)
        .unwrap_err();
    match err {
        SetupError::Initialize(tx_err) => assert_eq!(
            tx_err,
            TransactionError::InstructionError(
                0,
                InstructionError::Custom(offsig_error_code(OffsigError::AlreadyInitialized))
            )
        ),
        other => panic!("unexpected setup error: {other:?}"),
    }
}
