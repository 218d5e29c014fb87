//! Prints the `Controller` CRD manifest as YAML.
//!
//! ```sh
//! cargo run -p crds --bin crdgen > config/crd/controllers.yaml
//! ```

use crds::Controller;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&Controller::crd())?);
    Ok(())
}
