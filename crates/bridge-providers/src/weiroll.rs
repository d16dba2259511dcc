//! Weiroll command planning.
//!
//! Deposit hooks run as a single delegate-call into the weiroll VM, which
//! interprets a list of `bytes32` commands against a shared `bytes[]`
//! state. Each command word is `selector ++ flags ++ six input indices ++
//! output index ++ target address`; indices address state slots, with the
//! high bit marking a variable-length entry and `0xff` marking an unused
//! position. Commands with more than six arguments set the extended flag
//! and carry their indices in a follow-up word.

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolValue};
use bridge_types::{BridgeError, EvmCall};

/// The weiroll VM. Hooks delegate-call it, so planned commands run with
/// the proxy account as `address(this)`.
pub const WEIROLL_ADDRESS: Address = address!("9585c3062Df1C247d5E373Cfca9167F7dC2b5963");

sol! {
	interface IWeirollVm {
		function execute(bytes32[] commands, bytes[] state) external payable returns (bytes[] memory);
	}
}

const IDX_VARIABLE_LENGTH: u8 = 0x80;
const IDX_END_OF_ARGS: u8 = 0xff;
const FLAG_EXTENDED_COMMAND: u8 = 0x40;
const FLAG_TUPLE_RETURN: u8 = 0x80;

/// Slot indices are 7 bits wide; the high bit flags variable length.
const MAX_STATE_SLOTS: usize = 127;
/// An extended command carries one index byte per argument in a single
/// follow-up word.
const MAX_EXTENDED_INPUTS: usize = 32;

/// How a command invokes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
	DelegateCall,
	Call,
	StaticCall,
	CallWithValue,
}

impl CommandKind {
	fn flag(self) -> u8 {
		match self {
			CommandKind::DelegateCall => 0x00,
			CommandKind::Call => 0x01,
			CommandKind::StaticCall => 0x02,
			CommandKind::CallWithValue => 0x03,
		}
	}
}

/// How a command's return data is written back into state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
	/// A single 32-byte return value, stored as a fixed-length slot.
	Word,
	/// A single ABI-encoded dynamic return value; the VM strips the offset
	/// word and stores the length-prefixed payload.
	Bytes,
	/// The raw return data, stored without ABI decoding. The slot can be
	/// read back both as a word (when the call returned exactly 32 bytes)
	/// and as a variable-length value.
	Raw,
}

/// Handle to a state slot an earlier command writes its return into.
#[derive(Debug, Clone, Copy)]
pub struct ReturnValue {
	index: u8,
	variable: bool,
}

impl ReturnValue {
	/// References the slot as a fixed 32-byte value.
	pub fn as_word(self) -> PlanValue {
		PlanValue::SlotRef {
			index: self.index,
			variable: false,
		}
	}

	/// References the slot as a variable-length value.
	pub fn as_bytes(self) -> PlanValue {
		PlanValue::SlotRef {
			index: self.index,
			variable: true,
		}
	}
}

impl From<ReturnValue> for PlanValue {
	fn from(value: ReturnValue) -> Self {
		PlanValue::SlotRef {
			index: value.index,
			variable: value.variable,
		}
	}
}

/// One argument of a planned command.
#[derive(Debug, Clone)]
pub enum PlanValue {
	/// Fixed 32-byte literal.
	Word(B256),
	/// Variable-length literal, stored length-prefixed.
	Bytes(Bytes),
	/// Reference to the output slot of an earlier command.
	SlotRef { index: u8, variable: bool },
}

impl From<Address> for PlanValue {
	fn from(value: Address) -> Self {
		PlanValue::Word(B256::left_padding_from(value.as_slice()))
	}
}

impl From<U256> for PlanValue {
	fn from(value: U256) -> Self {
		PlanValue::Word(B256::from(value))
	}
}

impl From<u64> for PlanValue {
	fn from(value: u64) -> Self {
		U256::from(value).into()
	}
}

impl From<u32> for PlanValue {
	fn from(value: u32) -> Self {
		U256::from(value).into()
	}
}

impl From<Bytes> for PlanValue {
	fn from(value: Bytes) -> Self {
		PlanValue::Bytes(value)
	}
}

/// Builds a weiroll program command by command.
///
/// Literal arguments are deduplicated; return values allocate a fresh
/// slot each.
#[derive(Debug, Default)]
pub struct WeirollPlanner {
	commands: Vec<B256>,
	state: Vec<Bytes>,
}

impl WeirollPlanner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Plans a command whose return value is discarded.
	pub fn add(
		&mut self,
		target: Address,
		kind: CommandKind,
		selector: [u8; 4],
		args: &[PlanValue],
	) -> Result<(), BridgeError> {
		self.plan_command(target, kind, selector, args, None)
			.map(|_| ())
	}

	/// Plans a command and keeps its return value in a state slot.
	pub fn add_returning(
		&mut self,
		target: Address,
		kind: CommandKind,
		selector: [u8; 4],
		args: &[PlanValue],
		returns: ReturnKind,
	) -> Result<ReturnValue, BridgeError> {
		let handle = self.plan_command(target, kind, selector, args, Some(returns))?;
		handle.ok_or_else(|| {
			BridgeError::Validation("Weiroll command did not allocate its return slot".to_string())
		})
	}

	/// Encodes the plan as a delegate-call into the VM.
	pub fn into_call(self) -> EvmCall {
		let data = IWeirollVm::executeCall {
			commands: self.commands,
			state: self.state,
		}
		.abi_encode();

		EvmCall {
			to: WEIROLL_ADDRESS,
			value: U256::ZERO,
			data: Bytes::from(data),
		}
	}

	fn plan_command(
		&mut self,
		target: Address,
		kind: CommandKind,
		selector: [u8; 4],
		args: &[PlanValue],
		returns: Option<ReturnKind>,
	) -> Result<Option<ReturnValue>, BridgeError> {
		let mut indices = Vec::with_capacity(args.len());
		for arg in args {
			indices.push(self.input_index(arg)?);
		}

		let mut flags = kind.flag();
		if let Some(ReturnKind::Raw) = returns {
			flags |= FLAG_TUPLE_RETURN;
		}

		let (output_index, handle) = self.output_index(returns)?;

		let mut command = [0u8; 32];
		command[0..4].copy_from_slice(&selector);
		command[11] = output_index;
		command[12..32].copy_from_slice(target.as_slice());

		if indices.len() <= 6 {
			command[4] = flags;
			command[5..11].fill(IDX_END_OF_ARGS);
			command[5..5 + indices.len()].copy_from_slice(&indices);
			self.commands.push(B256::from(command));
		} else if indices.len() <= MAX_EXTENDED_INPUTS {
			command[4] = flags | FLAG_EXTENDED_COMMAND;
			command[5..11].fill(IDX_END_OF_ARGS);
			self.commands.push(B256::from(command));

			let mut extended = [IDX_END_OF_ARGS; 32];
			extended[..indices.len()].copy_from_slice(&indices);
			self.commands.push(B256::from(extended));
		} else {
			return Err(BridgeError::Validation(format!(
				"Weiroll command takes {} arguments, the limit is {}",
				indices.len(),
				MAX_EXTENDED_INPUTS
			)));
		}

		Ok(handle)
	}

	fn input_index(&mut self, arg: &PlanValue) -> Result<u8, BridgeError> {
		match arg {
			PlanValue::Word(word) => self.literal_slot(Bytes::copy_from_slice(word.as_slice())),
			PlanValue::Bytes(bytes) => {
				// The ABI tail: length word followed by the padded payload.
				let entry = Bytes::from(bytes.abi_encode()[32..].to_vec());
				Ok(IDX_VARIABLE_LENGTH | self.literal_slot(entry)?)
			}
			PlanValue::SlotRef { index, variable } => Ok(if *variable {
				IDX_VARIABLE_LENGTH | index
			} else {
				*index
			}),
		}
	}

	fn literal_slot(&mut self, entry: Bytes) -> Result<u8, BridgeError> {
		if let Some(existing) = self.state.iter().position(|slot| *slot == entry) {
			return Ok(existing as u8);
		}
		self.push_slot(entry)
	}

	fn push_slot(&mut self, entry: Bytes) -> Result<u8, BridgeError> {
		if self.state.len() >= MAX_STATE_SLOTS {
			return Err(BridgeError::Validation(format!(
				"Weiroll state exceeds {} slots",
				MAX_STATE_SLOTS
			)));
		}
		self.state.push(entry);
		Ok((self.state.len() - 1) as u8)
	}

	fn output_index(
		&mut self,
		returns: Option<ReturnKind>,
	) -> Result<(u8, Option<ReturnValue>), BridgeError> {
		match returns {
			None => Ok((IDX_END_OF_ARGS, None)),
			Some(ReturnKind::Word) => {
				let index = self.push_slot(Bytes::new())?;
				Ok((
					index,
					Some(ReturnValue {
						index,
						variable: false,
					}),
				))
			}
			Some(ReturnKind::Bytes) | Some(ReturnKind::Raw) => {
				let index = self.push_slot(Bytes::new())?;
				Ok((
					IDX_VARIABLE_LENGTH | index,
					Some(ReturnValue {
						index,
						variable: true,
					}),
				))
			}
		}
	}
}
