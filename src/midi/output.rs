//! MIDI output: an open connection to a MIDI output port.

use midir::{MidiOutput, MidiOutputConnection};

use super::{MidiError, MidiSink};

/// Active MIDI output connection. Dropping it closes the port.
pub struct MidiPort {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidiPort {
    /// Open the first output port whose name contains `device`.
    pub fn open(client_name: &str, device: &str) -> Result<Self, MidiError> {
        let midi_out = MidiOutput::new(client_name).map_err(|e| MidiError::Init(e.to_string()))?;

        let (port, port_name) = midi_out
            .ports()
            .into_iter()
            .find_map(|p| {
                let name = midi_out.port_name(&p).unwrap_or_default();
                name.contains(device).then_some((p, name))
            })
            .ok_or_else(|| MidiError::PortNotFound(device.to_string()))?;

        let connection = midi_out
            .connect(&port, &format!("{client_name}-out"))
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        log::info!("opened MIDI output '{port_name}'");
        Ok(Self {
            connection,
            port_name,
        })
    }

    /// Get the connected port name.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Close the port explicitly.
    pub fn close(self) {
        let Self {
            connection,
            port_name,
        } = self;
        connection.close();
        log::info!("closed MIDI output '{port_name}'");
    }

    /// List all available MIDI output device names.
    pub fn list_devices(client_name: &str) -> Vec<String> {
        let Ok(midi_out) = MidiOutput::new(client_name) else {
            return Vec::new();
        };
        midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect()
    }
}

impl MidiSink for MidiPort {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        self.connection
            .send(bytes)
            .map_err(|e| MidiError::Send(e.to_string()))
    }
}

impl std::fmt::Debug for MidiPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiPort")
            .field("port_name", &self.port_name)
            .finish()
    }
}
