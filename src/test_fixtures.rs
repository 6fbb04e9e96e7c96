//! Signed records produced offline with an independent ECDSA implementation.
//! Signing nonces are SHA-512(d || digest) mod (n - 1) + 1, so the crate's own
//! fixture signer reproduces these values.

// Published ChargePoint sample key. No signed record over it is available, so
// tests only parse it; signed sessions below use CP224_PRIVATE_KEY instead.
pub const CP224_SAMPLE_PUBLIC_KEY: &str = "430b9db2bbba0259d6f6ed801bcf053c82a43b9c94c02f0d84a339dd485527a7da5f573e11d854762eaa8f4aae195b3d7a68c9d4df794ba6";

// secp192r1 meter key and a three value EMHCrypt01 session
pub const EMH_PRIVATE_KEY: &str = "081f5ff0a18baea2a5791e81adee9851be6dde0b7d6d21fb";
pub const EMH_PUBLIC_KEY: &str = "6884b5aa04e796bcace005584af1e7b3a59848b2bff304097a1621ae057d350afb8843b76335cc4ce6cd5c3491c5e600";
pub const EMH_BUFFER_0: &str = "0901454d4800007f9f3e202c5e5f0864000000010000100100010800ff1effe80300000000000000013034413142324333443445354636000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000180c5e5f000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";
pub const EMH_R_0: &str = "e992baaf977cb7550c7385b8d3428e02b60dfc1c11c3fd02";
pub const EMH_S_0: &str = "a022cb6a9d6481f91ec9926a606a609bb25da88c2c0de7d4";
pub const EMH_R_1: &str = "83de483e83dc2815a4e8bd47f2a40bebb0b4ff63ce3d5446";
pub const EMH_S_1: &str = "8e1f5503a67655741ff8141c689bd8451dd3ecec827baeff";
pub const EMH_R_2: &str = "e2232289b8975f2300d5606112d32f1559ac56cb1b8ca15c";
pub const EMH_S_2: &str = "6199c2a4faae934a6d4498fd4628377239b9e1446dee54e2";

// secp256r1 meter key and a two value BSMCrypt01 session
pub const BSM_PRIVATE_KEY: &str = "fbb8efbe2c60f2094bc88cf08ce27443d891fbdae027d323fdb88b7b2b34cb5f";
pub const BSM_PUBLIC_KEY: &str = "394b8524f0c0d4774eaad00a3f0c78b8ed5865e12eb9cada2a3943ac932a74e7995212aa44f3f94dd76b15b38f509acaa297ebe303577d408991e97553423c07";
pub const BSM_R_0: &str = "d52c4f5af8c670d7d922a2f693c8055aab3c16dfdc21cb4e20349d14f81a6cfe";
pub const BSM_S_0: &str = "46e2af139d565371f47586ed5152ba3d3cdd722d12acdc99fb4cdb42e9d668bb";
pub const BSM_R_1: &str = "0e0e69a566703a14067dcad5892b4d2278b24914a49e2e40a57c7861319332dc";
pub const BSM_S_1: &str = "e474f4a51e9cd7ec7dee3f683ae172a3bec43e3ec261896cbad2c2d602156d79";

// ChargePointCrypt01 session plaintext and DER session signatures
pub const CP224_PRIVATE_KEY: &str = "0046ecadd3c618afb854197bc6a90e93aa2f03c82b060d91993ef4e997";
pub const CP224_PUBLIC_KEY: &str = "30821f9684440517e934e6db9106b9868ec482314ab8fb55cf2a9371ec10486d81287ce316ed61f669f1e2845d3213fc960f003134a92dfc";
pub const CP_ORIGINAL: &str = "eyJzZXNzaW9uIjoiY3AtNDcxMSIsImV2c2UiOiJVUypDUEkqRTEyMzQqMSIsInN0YXJ0IjoxNjAwMDAwMDAwLCJzdG9wIjoxNjAwMDA3MjAwLCJlbmVyZ3lXaCI6MjUwMH0=";
pub const CP_224K1_SIGNATURE: &str = "303d021d00ae5f6b9a26d2cf54f2fb4454b2f7de14e9ff96bb7e2300c713bc79d4021c1516ea51d87dfbbd5544373f914e0fa3b737b47f9dc0395eb3af6dff";
pub const CP_256R1_SIGNATURE: &str = "30460221009f7ef9b893f0734b16e0c5381c3f618aaf35fa1597e9343100d4ff142b60620e022100f142c4c681eae7adf4d5611fdedf61ac310f4760fa174471123a7b6c787ffa7b";
pub const CP_384R1_SIGNATURE: &str = "3065023100dd610c7d35737faf103fdbaf7c1878e9deab63b79dbff9748df1a8fd2f25718bf17a269993085eaa1a3a1fd8ca657dad02305f5300871fc7b02eb48fef7c566e3c502513b21a9a5550fc3c79ff9a54bf1f441d39ab8b73f8d5eda05dc2b35c202591";
pub const CP_521R1_SIGNATURE: &str = "308188024201c989608654c3f33cde07d9b9a5415f3e51ddeda3ed39a826fbc0b58cb387c012f6de4761bbccd2f2ca86eea4c9ed74a86a9f01c62d095cb32de7ceec6cc933ac8e024200b3dd90f68ba25d9135511a7c256cca055b11016a479c5dbc222f2c544a21b7e9d599d23bdd2366cf4ad8ccc412e9a9bde6f67e50ef2a5fd5a6b35641800b5ad913";

// key used on every curve
pub const GENERIC_PRIVATE_KEY: &str = "0e9a3a6e1efa97ece60dab21c3cd3360ec526dab";
pub const GENERIC_256R1_PUBLIC_KEY: &str = "836ac7ce3175f13d151f43eab8fd7196a58a40197ad580a32f9b9f7149a47e7a173e374cd74e0389ad24d434b5601abbc7f1ac152425ffbf9aaa4beb7461b3e1";
pub const GENERIC_384R1_PUBLIC_KEY: &str = "7dfcabf3553d35fd6ba48f7ec8b943720d1ee207e137d78a30f8382becd7e50cdb68300d830edf919e8a60c1e519aade3c5a49a96cd8687766d583ebe9c334c40e4b0a7a427b60b6e976510c3be3877d30b39b0dee7896e27cab2614ebe6fcdc";
pub const GENERIC_521R1_PUBLIC_KEY: &str = "0167ee2718d7384476bf376ac09dd71b6e5c6818c5c679ad4e49ed32fc743931f9ecdd6f60b305b841b9d2954e86299a95269d930168a009b2d17b01befdaf9a4e8500b8ff95e49d69ee14a5c8c286b97ca34a02bbc99b69a028734761ed610cf6a6fa45e56a9f9101f50fe7292a60562330e245d95aeb96ee76bb86116d5a33666ce3b0";
pub const GENERIC_P256_R: &str = "44f5b75cf031438ca5342150734b0dc894239c818f79cfceb73a94561a13ecb2";
pub const GENERIC_P256_S: &str = "1fffc501749286e85d497739f6d2291ecac05a8e17914b9254e3990fe666c7e9";

// OCMF payload signed with the generic secp256r1 key
pub const OCMF_PAYLOAD: &str = r#"{"FV":"1.0","GI":"KEBA_KCP30","GS":"17619300","GV":"2.8.5","PG":"T32","MV":"Phoenix Contact","MM":"EEM-350-D-MCB","MS":"OCMF-METER-1","IS":true,"IL":"VERIFIED","IT":"ISO14443","ID":"1F2D3A4B","RD":[{"TM":"2020-09-13T12:26:40,000+0000 S","TX":"B","RV":1.0,"RI":"1-0:1.8.0","RU":"kWh","ST":"G"},{"TM":"2020-09-13T14:26:40,000+0000 S","TX":"E","RV":3.5,"RI":"1-0:1.8.0","RU":"kWh","ST":"G"}]}"#;
pub const OCMF_SIGNATURE: &str = "3044022032be72e90e51316b67647d563072d5642a985004f56e64d8f4205c1af8698d49022063bca63f66d58c470d9ee5263c04bd5a1b0a88f8c9452a9f9b9d5a86401af25c";
pub const OCMF_SIGNATURE_B64: &str = "MEQCIDK+cukOUTFrZ2R9VjBy1WQqmFAE9W5k2PQgXBr4aY1JAiBjvKY/ZtWMRw2e5SY8BL1aGwqI+MlFKp+bnVqGQBryXA==";
