use hardware_interface::{
    interface_kind, ActuatorHandle, ActuatorStateHandle, ActuatorStateInterface,
    ControllerClaims, HardwareInterfaceError, InterfaceSet, JointHandle, JointMode,
    JointModeHandle, JointModeInterface, JointStateHandle, JointStateInterface, ModeSlot,
    PositionJoint, PositionJointInterface, Slot, SlotArray,
};

interface_kind!(
    /// Vendor-specific joint command channel.
    pub FooJoint => FooJointInterface, handle = JointHandle, claims = true
);

fn state_slots() -> (Option<Slot>, Option<Slot>, Option<Slot>) {
    (Some(Slot::new(1.0)), Some(Slot::new(2.0)), Some(Slot::new(3.0)))
}

#[test]
fn missing_required_storage_is_rejected() {
    let (p, v, _) = state_slots();
    let err = ActuatorStateHandle::new("name1", p, v, None).unwrap_err();
    assert!(matches!(err, HardwareInterfaceError::Configuration { ref resource, .. } if resource == "name1"));
    assert!(err.to_string().contains("effort"));

    let (p, v, e) = state_slots();
    let state = ActuatorStateHandle::new("name1", p, v, e).unwrap();
    assert!(ActuatorHandle::new(state.clone(), None).is_err());
    let cmd = Some(Slot::default());
    for bad in [2, 4] {
        let gains = SlotArray::filled(bad, f64::NAN);
        assert!(ActuatorHandle::with_gains(state.clone(), cmd.clone(), Some(gains), None).is_err());
    }
    // feed-forward storage is optional
    let gains = SlotArray::filled(3, f64::NAN);
    assert!(ActuatorHandle::with_gains(state, cmd, Some(gains), None).is_ok());
}

#[test]
fn gains_and_feed_forward_round_trip_through_registry() {
    let (p, v, e) = state_slots();
    let gains = SlotArray::filled(3, f64::NAN);
    let ff = Slot::new(f64::NAN);
    let handle = ActuatorHandle::with_gains(
        ActuatorStateHandle::new("name_1", p, v, e).unwrap(),
        Some(Slot::new(0.0)),
        Some(gains.clone()),
        Some(ff.clone()),
    )
    .unwrap();
    let mut iface = hardware_interface::ActuatorCommandInterface::new();
    iface.register_handle(handle).unwrap();

    let h = iface.handle("name_1").unwrap();
    assert!(h.ff_term().is_nan());
    h.set_ff_term(10.0);
    assert_eq!(ff.get(), 10.0);

    assert!(gains.to_vec().iter().all(|g| g.is_nan()));
    h.set_pid_gains(1000.0, 1.0, 10.0);
    assert_eq!(gains.to_vec(), vec![1000.0, 1.0, 10.0]);
    let read = h.pid_gains();
    assert_eq!((read.p, read.i, read.d), (1000.0, 1.0, 10.0));
    assert!(read.i_max.is_nan() && read.i_min.is_nan());
    assert!(h.pid_gains_slot().unwrap().ptr_eq(&gains));
}

#[test]
#[should_panic(expected = "no mode storage")]
fn default_mode_handle_panics() {
    let _ = JointModeHandle::default().set_mode("PositionJointInterface");
}

fn robot() -> InterfaceSet {
    let mut act_state = ActuatorStateInterface::new();
    let mut jnt_state = JointStateInterface::new();
    let mut pos = PositionJointInterface::new();
    let mut foo = FooJointInterface::new();
    let mut modes = JointModeInterface::new();
    for name in ["hip", "knee"] {
        let (p, v, e) = state_slots();
        act_state
            .register_handle(ActuatorStateHandle::new(format!("{name}_motor"), p, v, e).unwrap())
            .unwrap();
        let (p, v, e) = state_slots();
        let state = JointStateHandle::new(name, p, v, e).unwrap();
        pos.register_handle(JointHandle::new(state.clone(), Some(Slot::default())).unwrap())
            .unwrap();
        foo.register_handle(JointHandle::new(state.clone(), Some(Slot::default())).unwrap())
            .unwrap();
        modes
            .register_handle(
                JointModeHandle::new(
                    name,
                    Some(ModeSlot::default()),
                    "PositionJointInterface",
                    ["PositionJointInterface", "FooJointInterface"],
                )
                .unwrap(),
            )
            .unwrap();
        jnt_state.register_handle(state).unwrap();
    }
    let mut set = InterfaceSet::new();
    set.register(act_state).unwrap();
    set.register(jnt_state).unwrap();
    set.register(pos).unwrap();
    set.register(foo).unwrap();
    set.register(modes).unwrap();
    set
}

#[test]
fn one_writer_per_joint_per_cycle() {
    let mut set = robot();

    let hip = set.get_mut::<PositionJoint>().unwrap().claim_handle("hip").unwrap();
    hip.set_command(0.3);
    let err = set.get_mut::<PositionJoint>().unwrap().claim("hip").unwrap_err();
    assert_eq!(
        err,
        HardwareInterfaceError::ClaimConflict {
            interface: "PositionJointInterface".into(),
            name: "hip".into(),
        }
    );
    // a custom kind claims independently of the standard ones
    set.get_mut::<FooJoint>().unwrap().claim("hip").unwrap();

    let mode = set.get_mut::<JointMode>().unwrap().claim_handle("knee").unwrap();
    mode.set_mode("FooJointInterface").unwrap();
    assert!(mode.set_mode("EffortJointInterface").is_err());
    assert_eq!(mode.mode(), "FooJointInterface");

    assert_eq!(set.claimed_resources().len(), 3);
    set.clear_claims();
    assert!(set.claimed_resources().is_empty());
    set.get_mut::<PositionJoint>().unwrap().claim("hip").unwrap();
}

#[test]
fn controllers_started_together_must_not_share_joints() {
    let set = robot();
    let pos = ControllerClaims::new("arm_position").with("PositionJointInterface", ["hip", "knee"]);
    let foo = ControllerClaims::new("foo_tuner").with("FooJointInterface", ["knee"]);
    let err = set.check_for_conflict(&[pos.clone(), foo]).unwrap_err();
    assert!(matches!(err, HardwareInterfaceError::ControllerConflict { ref resource, .. } if resource == "knee"));

    let modes = ControllerClaims::new("arm_position_modes").with("JointModeInterface", ["hip"]);
    assert!(set.check_for_conflict(&[pos, modes]).is_err());
}
