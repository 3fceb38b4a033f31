/*!
# bdbwatch DevKit - Faux cluster et utilitaires de test

Bibliothèque facilitant les tests du poller bdbwatch avec:
- Un cluster HTTP simulé (licence, inventaire BDB, métriques)
- Des fixtures de payloads (JSON de management, format d'exposition)
- Un harness qui relie le faux cluster à la configuration du poller
*/

pub mod fixtures;
pub mod mock_cluster;
pub mod test_utils;

pub use fixtures::{bdb_record, license_payload, ExpositionBuilder, MB};
pub use mock_cluster::{MockCluster, RecordedRequest, BDBS_PATH, LICENSE_PATH, METRICS_PATH};
pub use test_utils::{TestHarness, TEST_AUTHORIZATION};
