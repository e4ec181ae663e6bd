//! A backend extended with vendor-specific `foo` and `bar` channels, loaded
//! from a packaged description.

use std::sync::Arc;

use hardware_interface::{
    interface_kind, ActuatorHandle, CollectingSink, JointHandle, PositionJoint, Severity,
};
use robot_hw::{BackendConfig, BackendError, JointConfig, RobotBackend};
use transmission_interface::{MemoryRetriever, Quantity, TransmissionState, YamlDescriptionParser};

interface_kind!(pub FooActuator => FooActuatorInterface, handle = ActuatorHandle, claims = false);
interface_kind!(pub BarActuator => BarActuatorInterface, handle = ActuatorHandle, claims = false);
interface_kind!(pub FooJoint => FooJointInterface, handle = JointHandle, claims = true);
interface_kind!(pub BarJoint => BarJointInterface, handle = JointHandle, claims = true);

const DESCRIPTION_URI: &str = "package://extended_robot_hw_tests/config/extended_simple.yaml";

const DESCRIPTION: &str = "
transmissions:
  - name: extended_simple_trans
    type: transmission_interface/SimpleTransmission
    actuators:
      - name: extended_actuator
        mechanical_reduction: 10.0
    joints:
      - name: extended_joint
        offset: 0.5
        hardware_interfaces:
          - hardware_interface/PositionJointInterface
          - hardware_interface/VelocityJointInterface
          - hardware_interface/EffortJointInterface
          - FooJointInterface
          - BarJointInterface
";

fn extended_backend(sink: Arc<CollectingSink>) -> RobotBackend {
    let mut backend = RobotBackend::builder("extended")
        .actuator("extended_actuator")
        .joint(JointConfig::new("extended_joint"))
        .state_channel("foo", Quantity::Position)
        .state_channel("bar", Quantity::Effort)
        .command_interface::<FooJoint, FooActuator>(Quantity::Position)
        .command_interface::<BarJoint, BarActuator>(Quantity::Effort)
        .sink(sink)
        .build()
        .unwrap();
    let mut retriever = MemoryRetriever::new();
    retriever.insert(DESCRIPTION_URI, DESCRIPTION);
    let outcomes = backend
        .load_description(&retriever, &YamlDescriptionParser, DESCRIPTION_URI)
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state, TransmissionState::Active);
    backend
}

#[test]
fn custom_state_channels_follow_the_transmission() {
    let backend = extended_backend(Arc::new(CollectingSink::new()));
    let act = backend.actuator("extended_actuator").unwrap();
    act.position.set(10.0);
    act.velocity.set(20.0);
    act.effort.set(3.0);
    act.channel("foo").unwrap().set(5.0);
    act.channel("bar").unwrap().set(2.0);

    backend.read();

    let jnt = backend.joint("extended_joint").unwrap();
    assert!((jnt.position.get() - 1.5).abs() < 1e-12);
    assert!((jnt.velocity.get() - 2.0).abs() < 1e-12);
    assert!((jnt.effort.get() - 30.0).abs() < 1e-12);
    // foo follows the position transform, offset included; bar follows effort
    assert!((jnt.channel("foo").unwrap().get() - 1.0).abs() < 1e-12);
    assert!((jnt.channel("bar").unwrap().get() - 20.0).abs() < 1e-12);

    let channels: Vec<_> = backend
        .transmissions()
        .get("extended_simple_trans")
        .unwrap()
        .state_channels()
        .iter()
        .map(|c| c.label.clone())
        .collect();
    assert_eq!(channels, ["position", "velocity", "effort", "bar", "foo"]);
}

#[test]
fn custom_command_interfaces_reach_the_actuator() {
    let mut backend = extended_backend(Arc::new(CollectingSink::new()));
    backend.begin_cycle();
    let foo = backend
        .interfaces_mut()
        .get_mut::<FooJoint>()
        .unwrap()
        .claim_handle("extended_joint")
        .unwrap();
    let bar = backend
        .interfaces_mut()
        .get_mut::<BarJoint>()
        .unwrap()
        .claim_handle("extended_joint")
        .unwrap();
    foo.set_command(1.5);
    bar.set_command(30.0);

    backend.write();

    let act = backend.actuator("extended_actuator").unwrap();
    assert!((act.command("FooActuatorInterface").unwrap().get() - 10.0).abs() < 1e-12);
    assert!((act.command("BarActuatorInterface").unwrap().get() - 3.0).abs() < 1e-12);
    // standard channels were not commanded
    assert_eq!(act.command("PositionActuatorInterface").unwrap().get(), -5.0);
    assert_eq!(act.command("EffortActuatorInterface").unwrap().get(), 0.0);
}

#[test]
fn cycle_owner_clears_claims() {
    let mut backend = extended_backend(Arc::new(CollectingSink::new()));
    for _ in 0..3 {
        backend.begin_cycle();
        backend.read();
        let handle = backend
            .interfaces_mut()
            .get_mut::<PositionJoint>()
            .unwrap()
            .claim_handle("extended_joint")
            .unwrap();
        handle.set_command(0.5);
        assert!(backend
            .interfaces_mut()
            .get_mut::<PositionJoint>()
            .unwrap()
            .claim("extended_joint")
            .is_err());
        backend.write();
    }
    let act = backend.actuator("extended_actuator").unwrap();
    assert_eq!(act.command("PositionActuatorInterface").unwrap().get(), 0.0);
}

#[test]
fn undeclared_custom_interface_is_skipped_and_reported() {
    let sink = Arc::new(CollectingSink::new());
    let mut backend = RobotBackend::builder("plain")
        .actuator("extended_actuator")
        .joint(JointConfig::new("extended_joint"))
        .sink(sink.clone())
        .build()
        .unwrap();
    let mut retriever = MemoryRetriever::new();
    retriever.insert(DESCRIPTION_URI, DESCRIPTION);
    let outcomes = backend
        .load_description(&retriever, &YamlDescriptionParser, DESCRIPTION_URI)
        .unwrap();
    assert_eq!(outcomes[0].state, TransmissionState::Validated);
    assert!(backend.transmissions().is_empty());
    assert_eq!(sink.count(Severity::Warning), 1);
}

#[test]
fn description_failures_abort_initialisation() {
    let mut backend = RobotBackend::builder("plain")
        .actuator("extended_actuator")
        .joint(JointConfig::new("extended_joint"))
        .build()
        .unwrap();
    let retriever = MemoryRetriever::new();
    let err = backend
        .load_description(&retriever, &YamlDescriptionParser, DESCRIPTION_URI)
        .unwrap_err();
    assert!(matches!(err, BackendError::Retrieval(_)));

    let mut retriever = MemoryRetriever::new();
    retriever.insert(DESCRIPTION_URI, "transmissions: {");
    let err = backend
        .load_description(&retriever, &YamlDescriptionParser, DESCRIPTION_URI)
        .unwrap_err();
    assert!(matches!(err, BackendError::Description(_)));
}

#[test]
fn from_config_reads_packaged_description() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("config")).unwrap();
    std::fs::write(root.path().join("config/extended_simple.yaml"), DESCRIPTION).unwrap();
    let config = BackendConfig::from_yaml_str(&format!(
        "name: extended\n\
         actuators: [extended_actuator]\n\
         joints:\n  - name: extended_joint\n\
         description: {DESCRIPTION_URI}\n\
         package_roots:\n  extended_robot_hw_tests: {}\n\
         strict: true\n",
        root.path().display()
    ))
    .unwrap();

    // Foo and Bar are not known to a configured backend
    let err = RobotBackend::from_config(&config).err();
    assert!(matches!(err, Some(BackendError::Transmission { .. })));

    let lenient = BackendConfig {
        strict: false,
        ..config
    };
    let backend = RobotBackend::from_config(&lenient).unwrap();
    assert!(backend.transmissions().is_empty());
    assert_eq!(backend.load_outcomes().len(), 1);
}
